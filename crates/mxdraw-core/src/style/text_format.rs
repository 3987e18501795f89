use super::{
    Applied, Color, Number, StyleDict, StyleValue, push_bool, push_display, push_number,
    set_bool, set_color, set_number, set_percent, set_string,
};
use crate::error::Result;
use std::str::FromStr;

macro_rules! style_token_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                match s {
                    $($token => Ok($name::$variant),)+
                    other => Err($crate::error::Error::invalid_enumeration($kind, other)),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use style_token_enum;

style_token_enum! {
    /// Horizontal text alignment, also used for `labelPosition`.
    Align, "align" {
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

style_token_enum! {
    /// Vertical text alignment, also used for `verticalLabelPosition`.
    VerticalAlign, "vertical align" {
        Top => "top",
        Middle => "middle",
        Bottom => "bottom",
    }
}

style_token_enum! {
    /// Text direction, written as `horizontal=1` / `horizontal=0`.
    Direction, "direction" {
        Horizontal => "horizontal",
        Vertical => "vertical",
    }
}

const FONT_BOLD: u8 = 1;
const FONT_ITALIC: u8 = 2;
const FONT_UNDERLINE: u8 = 4;

/// Label typography shared by shapes and edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormat {
    pub font_color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<Number>,
    /// Bit flags: bold = 1, italic = 2, underline = 4.
    pub font_style: Option<u8>,
    pub align: Option<Align>,
    pub vertical_align: Option<VerticalAlign>,
    pub label_position: Option<Align>,
    pub vertical_label_position: Option<VerticalAlign>,
    pub direction: Option<Direction>,
    pub spacing: Option<Number>,
    pub spacing_top: Option<Number>,
    pub spacing_bottom: Option<Number>,
    pub spacing_left: Option<Number>,
    pub spacing_right: Option<Number>,
    pub label_background_color: Option<Color>,
    pub label_border_color: Option<Color>,
    pub text_opacity: Option<u8>,
    pub text_shadow: Option<bool>,
}

impl TextFormat {
    pub fn bold(&self) -> bool {
        self.font_style.unwrap_or(0) & FONT_BOLD != 0
    }

    pub fn italic(&self) -> bool {
        self.font_style.unwrap_or(0) & FONT_ITALIC != 0
    }

    pub fn underline(&self) -> bool {
        self.font_style.unwrap_or(0) & FONT_UNDERLINE != 0
    }

    pub fn set_bold(&mut self, on: bool) {
        self.set_font_flag(FONT_BOLD, on);
    }

    pub fn set_italic(&mut self, on: bool) {
        self.set_font_flag(FONT_ITALIC, on);
    }

    pub fn set_underline(&mut self, on: bool) {
        self.set_font_flag(FONT_UNDERLINE, on);
    }

    fn set_font_flag(&mut self, flag: u8, on: bool) {
        let bits = self.font_style.unwrap_or(0);
        self.font_style = Some(if on { bits | flag } else { bits & !flag });
    }

    pub fn set_font_color(&mut self, color: &str) -> Result<()> {
        self.font_color = Some(color.parse()?);
        Ok(())
    }

    pub(crate) fn apply_entry(&mut self, key: &str, value: &StyleValue) -> Applied {
        match key {
            "fontColor" => set_color(&mut self.font_color, value),
            "fontFamily" => set_string(&mut self.font_family, value),
            "fontSize" => set_number(&mut self.font_size, value),
            "fontStyle" => match value {
                StyleValue::Int(v) if (0..=255).contains(v) => {
                    self.font_style = Some(*v as u8);
                    Applied::Set
                }
                _ => Applied::Rejected,
            },
            "align" => set_token(&mut self.align, value),
            "verticalAlign" => set_token(&mut self.vertical_align, value),
            "labelPosition" => set_token(&mut self.label_position, value),
            "verticalLabelPosition" => set_token(&mut self.vertical_label_position, value),
            "horizontal" => match value.as_bool() {
                Some(true) => {
                    self.direction = Some(Direction::Horizontal);
                    Applied::Set
                }
                Some(false) => {
                    self.direction = Some(Direction::Vertical);
                    Applied::Set
                }
                None => Applied::Rejected,
            },
            "spacing" => set_number(&mut self.spacing, value),
            "spacingTop" => set_number(&mut self.spacing_top, value),
            "spacingBottom" => set_number(&mut self.spacing_bottom, value),
            "spacingLeft" => set_number(&mut self.spacing_left, value),
            "spacingRight" => set_number(&mut self.spacing_right, value),
            "labelBackgroundColor" => set_color(&mut self.label_background_color, value),
            "labelBorderColor" => set_color(&mut self.label_border_color, value),
            "textOpacity" => set_percent(&mut self.text_opacity, value),
            "textShadow" => set_bool(&mut self.text_shadow, value),
            _ => Applied::Unknown,
        }
    }

    /// Appends the set attributes in their fixed output order. `fallback_font_color` comes from
    /// a color scheme and only applies when no explicit font color is set.
    pub(crate) fn write_entries(&self, dict: &mut StyleDict, fallback_font_color: Option<&Color>) {
        push_display(
            dict,
            "fontColor",
            self.font_color.as_ref().or(fallback_font_color),
        );
        push_display(dict, "fontFamily", self.font_family.as_deref());
        push_number(dict, "fontSize", self.font_size);
        dict.insert_opt("fontStyle", self.font_style.map(i64::from));
        push_display(dict, "align", self.align);
        push_display(dict, "verticalAlign", self.vertical_align);
        push_display(dict, "labelPosition", self.label_position);
        push_display(dict, "verticalLabelPosition", self.vertical_label_position);
        push_bool(
            dict,
            "horizontal",
            self.direction.map(|d| d == Direction::Horizontal),
        );
        push_number(dict, "spacing", self.spacing);
        push_number(dict, "spacingTop", self.spacing_top);
        push_number(dict, "spacingBottom", self.spacing_bottom);
        push_number(dict, "spacingLeft", self.spacing_left);
        push_number(dict, "spacingRight", self.spacing_right);
        push_display(
            dict,
            "labelBackgroundColor",
            self.label_background_color.as_ref(),
        );
        push_display(dict, "labelBorderColor", self.label_border_color.as_ref());
        dict.insert_opt("textOpacity", self.text_opacity.map(i64::from));
        push_bool(dict, "textShadow", self.text_shadow);
    }
}

fn set_token<T: FromStr>(slot: &mut Option<T>, value: &StyleValue) -> Applied {
    match value.to_style_string().parse::<T>() {
        Ok(v) => {
            *slot = Some(v);
            Applied::Set
        }
        Err(_) => Applied::Rejected,
    }
}
