//! Fixed card layout. Every position is tied to the 400×600 template.

use crate::identity::CardDetails;
use crate::rendering::paint::{parse_hex_color, Circle, FontSpec, Layer, PaintCommand, TextAlign};
use crate::rendering::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::Result;

pub const PHOTO_SIZE: u32 = 144;
pub const PHOTO_TOP: i32 = 107;
pub const TEXT_COLOR: &str = "#FFFFFF";
pub const ROLE_TITLE: &str = "DISTRICT FIELD REPORTER";

const CENTER_X: f32 = CANVAS_WIDTH as f32 / 2.0;

const NAME_FONT: FontSpec = FontSpec::bold(30.0);
const ROLE_FONT: FontSpec = FontSpec::regular(16.0);
const DETAIL_LABEL_FONT: FontSpec = FontSpec::bold(22.0);
const DETAIL_VALUE_FONT: FontSpec = FontSpec::regular(22.0);
const VALIDITY_FONT: FontSpec = FontSpec::bold(11.0);

const NAME_BASELINE: f32 = 400.0;
const ROLE_BASELINE: f32 = 425.0;
const ID_ROW_BASELINE: f32 = 480.0;
const DOB_ROW_BASELINE: f32 = 515.0;
const VALIDITY_BASELINE: f32 = 550.0;

const LABEL_X: f32 = 80.0;
const COLON_X: f32 = 160.0;
const VALUE_X: f32 = 180.0;

/// Top-left corner of the photo box
pub fn photo_origin() -> (i32, i32) {
    (CANVAS_WIDTH as i32 / 2 - PHOTO_SIZE as i32 / 2, PHOTO_TOP)
}

/// Circle the photo is clipped to
pub fn photo_clip() -> Circle {
    let (x, y) = photo_origin();
    let r = PHOTO_SIZE as f32 / 2.0;
    Circle { cx: x as f32 + r, cy: y as f32 + r, radius: r }
}

/// Stage one: the template stretched over the whole canvas
pub fn template_commands() -> Vec<PaintCommand> {
    vec![PaintCommand::Image {
        layer: Layer::Template,
        x: 0,
        y: 0,
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        clip: None,
    }]
}

/// Stage two: the cropped photo inside its circular frame
pub fn photo_commands() -> Vec<PaintCommand> {
    let (x, y) = photo_origin();
    vec![PaintCommand::Image {
        layer: Layer::Photo,
        x,
        y,
        width: PHOTO_SIZE,
        height: PHOTO_SIZE,
        clip: Some(photo_clip()),
    }]
}

/// Stage three: name, role, identifier, date of birth and validity line
pub fn text_commands(details: &CardDetails) -> Result<Vec<PaintCommand>> {
    let rgba = parse_hex_color(TEXT_COLOR)?;
    let text = |x: f32, baseline: f32, s: &str, font: FontSpec, align: TextAlign| PaintCommand::Text {
        x,
        baseline,
        text: s.to_string(),
        font,
        align,
        rgba,
    };

    Ok(vec![
        text(CENTER_X, NAME_BASELINE, &details.name, NAME_FONT, TextAlign::Center),
        text(CENTER_X, ROLE_BASELINE, ROLE_TITLE, ROLE_FONT, TextAlign::Center),
        text(LABEL_X, ID_ROW_BASELINE, "ID NO", DETAIL_LABEL_FONT, TextAlign::Left),
        text(LABEL_X, DOB_ROW_BASELINE, "DOB", DETAIL_LABEL_FONT, TextAlign::Left),
        text(COLON_X, ID_ROW_BASELINE, ":", DETAIL_LABEL_FONT, TextAlign::Left),
        text(COLON_X, DOB_ROW_BASELINE, ":", DETAIL_LABEL_FONT, TextAlign::Left),
        text(VALUE_X, ID_ROW_BASELINE, &details.id_number.to_uppercase(), DETAIL_VALUE_FONT, TextAlign::Left),
        text(VALUE_X, DOB_ROW_BASELINE, &details.date_of_birth, DETAIL_VALUE_FONT, TextAlign::Left),
        text(CENTER_X, VALIDITY_BASELINE, &details.validity_line(), VALIDITY_FONT, TextAlign::Center),
    ])
}

/// Full display list in paint order
pub fn layout_card(details: &CardDetails) -> Result<Vec<PaintCommand>> {
    let mut commands = template_commands();
    commands.extend(photo_commands());
    commands.extend(text_commands(details)?);
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::CardDates;
    use chrono::NaiveDate;

    fn details() -> CardDetails {
        CardDetails {
            name: "ASHA RAO".into(),
            id_number: "KN-0712".into(),
            date_of_birth: "07-03-1994".into(),
            dates: CardDates::from_issue(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()).unwrap(),
        }
    }

    #[test]
    fn photo_box_is_centered_below_header() {
        assert_eq!(photo_origin(), (128, 107));
        let c = photo_clip();
        assert_eq!((c.cx, c.cy, c.radius), (200.0, 179.0, 72.0));
    }

    #[test]
    fn layout_paints_template_then_photo_then_text() {
        let cmds = layout_card(&details()).unwrap();
        assert_eq!(cmds.len(), 11);
        assert!(matches!(cmds[0], PaintCommand::Image { layer: Layer::Template, width: 400, height: 600, .. }));
        assert!(matches!(cmds[1], PaintCommand::Image { layer: Layer::Photo, clip: Some(_), .. }));
        assert!(cmds[2..].iter().all(|c| matches!(c, PaintCommand::Text { .. })));
    }

    #[test]
    fn identifier_is_drawn_upper_cased() {
        let mut d = details();
        d.id_number = "KN-07ab".into();
        let cmds = text_commands(&d).unwrap();
        assert!(cmds.iter().any(|c| matches!(c, PaintCommand::Text { text, .. } if text == "KN-07AB")));
        assert!(!cmds.iter().any(|c| matches!(c, PaintCommand::Text { text, .. } if text == "KN-07ab")));
    }

    #[test]
    fn text_rows_use_fixed_positions() {
        let cmds = text_commands(&details()).unwrap();
        let find = |needle: &str| {
            cmds.iter()
                .find_map(|c| match c {
                    PaintCommand::Text { x, baseline, text, font, align, .. } if text == needle => {
                        Some((*x, *baseline, *font, *align))
                    }
                    _ => None,
                })
                .unwrap()
        };

        assert_eq!(find("ASHA RAO"), (200.0, 400.0, FontSpec::bold(30.0), TextAlign::Center));
        assert_eq!(find(ROLE_TITLE), (200.0, 425.0, FontSpec::regular(16.0), TextAlign::Center));
        assert_eq!(find("KN-0712"), (180.0, 480.0, FontSpec::regular(22.0), TextAlign::Left));
        assert_eq!(find("07-03-1994"), (180.0, 515.0, FontSpec::regular(22.0), TextAlign::Left));
        assert_eq!(
            find("Issued: 18-10-2026 | Expires: 18-04-2027"),
            (200.0, 550.0, FontSpec::bold(11.0), TextAlign::Center)
        );
    }
}
