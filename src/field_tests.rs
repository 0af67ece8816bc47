use super::*;

fn type_text(field: &mut PromptField, text: &str) {
    for ch in text.chars() {
        field.insert_char(ch);
    }
}

#[test]
fn new_field_puts_cursor_at_end() {
    let field = PromptField::new("猫, dog");
    assert_eq!(field.cursor(), 6);
    assert_eq!(field.selection(), (6, 6));
}

#[test]
fn typing_and_backspace_follow_the_cursor() {
    let mut field = PromptField::default();
    type_text(&mut field, "cta");
    assert!(field.move_left(false));
    assert!(field.move_left(false));
    assert!(field.backspace());
    type_text(&mut field, "ca");
    assert!(field.move_end(false));
    assert!(field.backspace());
    assert_eq!(field.text(), "cat");
    assert_eq!(field.cursor(), 3);
}

#[test]
fn delete_removes_character_under_cursor() {
    let mut field = PromptField::new("abc");
    field.move_home(false);
    assert!(field.delete());
    assert_eq!(field.text(), "bc");
    field.move_end(false);
    assert!(!field.delete());
}

#[test]
fn shift_movement_extends_selection_in_either_direction() {
    let mut field = PromptField::new("cat, dog");
    field.move_left(true);
    field.move_left(true);
    field.move_left(true);
    assert_eq!(field.selection(), (5, 8));
    field.move_end(false);
    field.move_home(true);
    assert_eq!(field.selection(), (0, 8));
    field.move_right(false);
    assert!(!field.has_selection());
}

#[test]
fn typing_replaces_selection() {
    let mut field = PromptField::new("cat, dog");
    field.move_left(true);
    field.move_left(true);
    field.move_left(true);
    field.insert_char('x');
    assert_eq!(field.text(), "cat, x");
    assert_eq!(field.cursor(), 6);
}

#[test]
fn insert_tag_at_cursor_repositions_after_snippet() {
    let mut field = PromptField::new("cat, fox");
    for _ in 0..3 {
        field.move_left(false);
    }
    field.insert_tag("dog");
    assert_eq!(field.text(), "cat, dog, fox");
    assert_eq!(field.cursor(), 10);
}

#[test]
fn insert_tag_replaces_selection() {
    let mut field = PromptField::new("cat, dog, fox");
    field.move_home(false);
    for _ in 0..5 {
        field.move_right(false);
    }
    for _ in 0..3 {
        field.move_right(true);
    }
    field.insert_tag("wolf");
    assert_eq!(field.text(), "cat, wolf, fox");
    assert!(!field.has_selection());
}

#[test]
fn insert_tag_into_empty_field_is_bare() {
    let mut field = PromptField::default();
    field.insert_tag("1girl");
    assert_eq!(field.text(), "1girl");
    assert_eq!(field.cursor(), 5);
}

#[test]
fn remove_tag_clamps_cursor_and_reports_rule() {
    let mut field = PromptField::new("cat, dog, fox");
    assert_eq!(field.remove_tag("fox"), Removal::Inline);
    assert_eq!(field.text(), "cat, dog");
    assert_eq!(field.cursor(), 8);
    assert_eq!(field.remove_tag("cat"), Removal::Leading);
    assert_eq!(field.text(), "dog");
    assert_eq!(field.remove_tag("zebra"), Removal::Absent);
    assert_eq!(field.text(), "dog");
}

#[test]
fn prompt_fields_route_by_target() {
    let mut fields = PromptFields::new("smile", "lowres");
    fields.get_mut(Target::route(false, true)).insert_tag("blurry");
    fields.get_mut(Target::route(false, false)).insert_tag("1girl");
    assert_eq!(fields.get(Target::Secondary).text(), "lowres, blurry, ");
    assert_eq!(fields.get(Target::Primary).text(), "smile, 1girl, ");
}
