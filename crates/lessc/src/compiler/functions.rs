//! Function library: built-in color and math helpers plus functions
//! registered at runtime.
//!
//! Built-ins receive their reduced arguments and return `None` when the
//! arguments do not fit, in which case the call is written out as plain CSS.

use std::collections::{HashMap, HashSet};

use phf::phf_map;

use crate::types::{Color, ListDelim, Value};

pub type Builtin = fn(&[Value]) -> Option<Value>;

type UserFn = Box<dyn Fn(&Value) -> Value>;

pub static BUILTINS: phf::Map<&'static str, Builtin> = phf_map! {
    "darken" => darken as Builtin,
    "lighten" => lighten as Builtin,
    "saturate" => saturate as Builtin,
    "desaturate" => desaturate as Builtin,
    "spin" => spin as Builtin,
    "fadein" => fadein as Builtin,
    "fadeout" => fadeout as Builtin,
    "hue" => hue as Builtin,
    "saturation" => saturation as Builtin,
    "lightness" => lightness as Builtin,
    "alpha" => alpha as Builtin,
    "e" => unquote as Builtin,
    "percentage" => percentage as Builtin,
    "round" => round as Builtin,
    "ceil" => ceil as Builtin,
    "floor" => floor as Builtin,
    "rgbahex" => rgbahex as Builtin,
};

/// Functions visible to a compiler. User functions shadow built-ins of the
/// same name; unregistering a built-in hides it.
#[derive(Default)]
pub struct FunctionRegistry {
    user: HashMap<String, UserFn>,
    disabled: HashSet<String>,
}

impl FunctionRegistry {
    /// Registers `f` under `name`. It receives the call's reduced arguments:
    /// the single argument itself, or a comma list when there are several.
    pub fn register<F, R>(&mut self, name: &str, f: F)
    where
        F: Fn(&Value) -> R + 'static,
        R: Into<Value>,
    {
        self.disabled.remove(name);
        self.user
            .insert(name.to_string(), Box::new(move |args: &Value| f(args).into()));
    }

    pub fn unregister(&mut self, name: &str) {
        self.user.remove(name);
        if BUILTINS.contains_key(name) {
            self.disabled.insert(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.user.contains_key(name)
            || (BUILTINS.contains_key(name) && !self.disabled.contains(name))
    }

    /// Calls `name`, or returns `None` if no function of that name applies.
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        if let Some(f) = self.user.get(name) {
            return Some(f(&Value::compress(ListDelim::Comma, args.to_vec())));
        }
        if self.disabled.contains(name) {
            return None;
        }
        BUILTINS.get(name).and_then(|f| f(args))
    }
}

fn color_arg(args: &[Value], index: usize) -> Option<Color> {
    match args.get(index)? {
        Value::Color(color) => Some(*color),
        _ => None,
    }
}

fn number_arg(args: &[Value], index: usize) -> Option<f64> {
    match args.get(index)? {
        Value::Number { value, .. } => Some(*value),
        _ => None,
    }
}

/// `f(color, amount)` through HSL; the amount is in the component's units
/// (degrees for hue, percent otherwise).
fn adjust_hsl(
    args: &[Value],
    f: impl Fn((f64, f64, f64), f64) -> (f64, f64, f64),
) -> Option<Value> {
    let color = color_arg(args, 0)?;
    let amount = number_arg(args, 1)?;
    let (h, s, l) = f(color.to_hsl(), amount);
    Some(Value::Color(Color::from_hsl(h, s, l, color.a)))
}

fn darken(args: &[Value]) -> Option<Value> {
    adjust_hsl(args, |(h, s, l), n| (h, s, l - n))
}

fn lighten(args: &[Value]) -> Option<Value> {
    adjust_hsl(args, |(h, s, l), n| (h, s, l + n))
}

fn saturate(args: &[Value]) -> Option<Value> {
    adjust_hsl(args, |(h, s, l), n| (h, s + n, l))
}

fn desaturate(args: &[Value]) -> Option<Value> {
    adjust_hsl(args, |(h, s, l), n| (h, s - n, l))
}

fn spin(args: &[Value]) -> Option<Value> {
    adjust_hsl(args, |(h, s, l), n| (h + n, s, l))
}

fn fade(args: &[Value], sign: f64) -> Option<Value> {
    let color = color_arg(args, 0)?;
    let amount = number_arg(args, 1)? / 100.0;
    let a = color.a.unwrap_or(1.0) + sign * amount;
    Some(Value::Color(Color { a: Some(a), ..color }.fixed()))
}

fn fadein(args: &[Value]) -> Option<Value> {
    fade(args, 1.0)
}

fn fadeout(args: &[Value]) -> Option<Value> {
    fade(args, -1.0)
}

fn hue(args: &[Value]) -> Option<Value> {
    let (h, _, _) = color_arg(args, 0)?.to_hsl();
    Some(Value::number(h.round()))
}

fn saturation(args: &[Value]) -> Option<Value> {
    let (_, s, _) = color_arg(args, 0)?.to_hsl();
    Some(Value::with_unit(s.round(), "%"))
}

fn lightness(args: &[Value]) -> Option<Value> {
    let (_, _, l) = color_arg(args, 0)?.to_hsl();
    Some(Value::with_unit(l.round(), "%"))
}

fn alpha(args: &[Value]) -> Option<Value> {
    Some(Value::number(color_arg(args, 0)?.a.unwrap_or(1.0)))
}

fn unquote(args: &[Value]) -> Option<Value> {
    Some(Value::keyword(args.first()?.text()?))
}

fn percentage(args: &[Value]) -> Option<Value> {
    Some(Value::with_unit(number_arg(args, 0)? * 100.0, "%"))
}

fn map_number(args: &[Value], f: fn(f64) -> f64) -> Option<Value> {
    match args.first()? {
        Value::Number { value, unit } => Some(Value::with_unit(f(*value), unit)),
        _ => None,
    }
}

fn round(args: &[Value]) -> Option<Value> {
    map_number(args, f64::round)
}

fn ceil(args: &[Value]) -> Option<Value> {
    map_number(args, f64::ceil)
}

fn floor(args: &[Value]) -> Option<Value> {
    map_number(args, f64::floor)
}

/// `#AARRGGBB`, the form old IE filters expect.
fn rgbahex(args: &[Value]) -> Option<Value> {
    let color = color_arg(args, 0)?.fixed();
    let a = (color.a.unwrap_or(1.0) * 255.0).round() as u32;
    Some(Value::keyword(format!(
        "#{:02X}{:02X}{:02X}{:02X}",
        a, color.r as u32, color.g as u32, color.b as u32
    )))
}
