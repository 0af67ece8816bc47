use ratatui::style::{Color, Modifier, Style};

/// Colors used by the tag picker
#[derive(Clone, Debug)]
pub struct Theme {
    /// Foreground color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for warnings shown in the status bar
    pub warning_fg: Color,

    /// Color for literal tag entries
    pub literal_fg: Color,

    /// Color for placeholder entries
    pub placeholder_fg: Color,

    /// Foreground color for the selected entry
    pub selected_fg: Color,

    /// Background color for the selected entry
    pub selected_bg: Color,

    /// Color for the active catalog tab
    pub tab_active_fg: Color,

    /// Color for inactive catalog tabs
    pub tab_inactive_fg: Color,

    /// Border color of the focused pane
    pub border_focused: Color,

    /// Border color of unfocused panes
    pub border_unfocused: Color,

    /// Marker color for the field tags are currently routed to
    pub target_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            warning_fg: Color::LightYellow,
            literal_fg: Color::Reset,
            placeholder_fg: Color::LightCyan,
            selected_fg: Color::Black,
            selected_bg: Color::White,
            tab_active_fg: Color::LightYellow,
            tab_inactive_fg: Color::Gray,
            border_focused: Color::LightBlue,
            border_unfocused: Color::DarkGray,
            target_fg: Color::LightGreen,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.warning_fg)
            .bg(self.status_bar_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn literal_style(&self) -> Style {
        Style::default().fg(self.literal_fg)
    }

    /// Placeholders are bold so groups stand out from the tags inside them
    pub fn placeholder_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default().fg(self.selected_fg).bg(self.selected_bg)
    }

    pub fn tab_style(&self) -> Style {
        Style::default().fg(self.tab_inactive_fg)
    }

    pub fn tab_active_style(&self) -> Style {
        Style::default()
            .fg(self.tab_active_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border_unfocused)
        }
    }

    pub fn target_style(&self) -> Style {
        Style::default()
            .fg(self.target_fg)
            .add_modifier(Modifier::BOLD)
    }
}
