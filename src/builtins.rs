use std::cell::RefCell;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::RuntimeError;
use crate::file::FileHandle;
use crate::function::NativeFunction;
use crate::interpreter::Interpreter;
use crate::object::Object;

/// Returns every native function, to be defined in the global environment at
/// interpreter construction. Arity is enforced by the call machinery before
/// any of these run.
pub fn all() -> Vec<NativeFunction> {
    vec![
        NativeFunction { name: "len", arity: 1, function: len },
        NativeFunction { name: "time_now", arity: 0, function: time_now },
        NativeFunction { name: "time_format", arity: 2, function: time_format },
        NativeFunction { name: "time_parse", arity: 2, function: time_parse },
        NativeFunction { name: "time_year", arity: 1, function: time_year },
        NativeFunction { name: "time_month", arity: 1, function: time_month },
        NativeFunction { name: "time_day", arity: 1, function: time_day },
        NativeFunction { name: "time_hour", arity: 1, function: time_hour },
        NativeFunction { name: "time_minute", arity: 1, function: time_minute },
        NativeFunction { name: "time_second", arity: 1, function: time_second },
        NativeFunction { name: "time_weekday", arity: 1, function: time_weekday },
        NativeFunction { name: "time_add", arity: 2, function: time_add },
        NativeFunction { name: "time_diff", arity: 2, function: time_diff },
        NativeFunction { name: "sleep", arity: 1, function: sleep },
        NativeFunction { name: "fopen", arity: 2, function: fopen },
        NativeFunction { name: "fclose", arity: 1, function: fclose },
        NativeFunction { name: "fread", arity: 1, function: fread },
        NativeFunction { name: "freadline", arity: 1, function: freadline },
        NativeFunction { name: "fwrite", arity: 2, function: fwrite },
        NativeFunction { name: "fwriteline", arity: 2, function: fwriteline },
        NativeFunction { name: "fexists", arity: 1, function: fexists },
        NativeFunction { name: "fsize", arity: 1, function: fsize },
    ]
}

/// A misuse error raised inside a builtin. The call machinery fills in the
/// line of the call site.
fn misuse(message: String) -> RuntimeError {
    RuntimeError { line: 0, message }
}

fn number_arg(name: &str, args: &[Object], index: usize) -> Result<f64, RuntimeError> {
    match &args[index] {
        Object::Number(number) => Ok(*number),
        other => Err(misuse(format!("{name} expects a number, got {} type", other.type_str()))),
    }
}

fn string_arg(name: &str, args: &[Object], index: usize) -> Result<String, RuntimeError> {
    match &args[index] {
        Object::String(string) => Ok(string.clone()),
        other => Err(misuse(format!("{name} expects a string, got {} type", other.type_str()))),
    }
}

fn file_arg(name: &str, args: &[Object], index: usize) -> Result<Rc<RefCell<FileHandle>>, RuntimeError> {
    match &args[index] {
        Object::File(handle) => Ok(Rc::clone(handle)),
        other => Err(misuse(format!("{name} expects a file, got {} type", other.type_str()))),
    }
}

/// Converts an epoch number into a UTC datetime.
fn datetime(name: &str, epoch: f64) -> Result<DateTime<Utc>, RuntimeError> {
    Utc.timestamp_opt(epoch as i64, 0)
        .single()
        .ok_or_else(|| misuse(format!("{name}: timestamp out of range")))
}

fn len(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    match &args[0] {
        Object::String(string) => Ok(Object::Number(string.chars().count() as f64)),
        Object::List(elements) => Ok(Object::Number(elements.borrow().len() as f64)),
        other => Err(misuse(format!("len expects a string or a list, got {} type", other.type_str()))),
    }
}

fn time_now(_: &mut Interpreter, _: Vec<Object>) -> Result<Object, RuntimeError> {
    Ok(Object::Number(Utc::now().timestamp() as f64))
}

fn time_format(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_format", &args, 0)?;
    let pattern = string_arg("time_format", &args, 1)?;

    let datetime = datetime("time_format", epoch)?;
    let mut formatted = String::new();
    match write!(formatted, "{}", datetime.format(&pattern)) {
        Ok(()) => Ok(Object::String(formatted)),
        Err(_) => Err(misuse(format!("time_format: invalid pattern '{pattern}'"))),
    }
}

/// Parses text against a strftime pattern; date-only patterns get midnight.
/// Yields nil when the text does not match.
fn time_parse(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let text = string_arg("time_parse", &args, 0)?;
    let pattern = string_arg("time_parse", &args, 1)?;

    let epoch = NaiveDateTime::parse_from_str(&text, &pattern)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(&text, &pattern)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|datetime| datetime.and_utc().timestamp());

    Ok(match epoch {
        Some(epoch) => Object::Number(epoch as f64),
        None => Object::Nil,
    })
}

fn time_year(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_year", &args, 0)?;
    Ok(Object::Number(datetime("time_year", epoch)?.year() as f64))
}

fn time_month(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_month", &args, 0)?;
    Ok(Object::Number(datetime("time_month", epoch)?.month() as f64))
}

fn time_day(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_day", &args, 0)?;
    Ok(Object::Number(datetime("time_day", epoch)?.day() as f64))
}

fn time_hour(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_hour", &args, 0)?;
    Ok(Object::Number(datetime("time_hour", epoch)?.hour() as f64))
}

fn time_minute(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_minute", &args, 0)?;
    Ok(Object::Number(datetime("time_minute", epoch)?.minute() as f64))
}

fn time_second(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_second", &args, 0)?;
    Ok(Object::Number(datetime("time_second", epoch)?.second() as f64))
}

/// Day of the week as a number, 0=Sunday through 6=Saturday.
fn time_weekday(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_weekday", &args, 0)?;
    let weekday = datetime("time_weekday", epoch)?.weekday();
    Ok(Object::Number(weekday.num_days_from_sunday() as f64))
}

fn time_add(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let epoch = number_arg("time_add", &args, 0)?;
    let seconds = number_arg("time_add", &args, 1)?;
    Ok(Object::Number(epoch + seconds))
}

fn time_diff(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let a = number_arg("time_diff", &args, 0)?;
    let b = number_arg("time_diff", &args, 1)?;
    Ok(Object::Number(a - b))
}

fn sleep(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let seconds = number_arg("sleep", &args, 0)?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(misuse(String::from("sleep expects a non-negative number of seconds")));
    }

    thread::sleep(Duration::from_secs_f64(seconds));
    Ok(Object::Nil)
}

fn fopen(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let path = string_arg("fopen", &args, 0)?;
    let mode = string_arg("fopen", &args, 1)?;

    Ok(match FileHandle::open(&path, &mode) {
        Some(handle) => Object::File(Rc::new(RefCell::new(handle))),
        None => Object::Nil,
    })
}

fn fclose(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let handle = file_arg("fclose", &args, 0)?;
    handle.borrow_mut().close();
    Ok(Object::Number(0.0))
}

fn fread(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let handle = file_arg("fread", &args, 0)?;
    let contents = handle.borrow_mut().read_all().map_err(misuse)?;
    Ok(Object::String(contents))
}

fn freadline(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let handle = file_arg("freadline", &args, 0)?;
    let line = handle.borrow_mut().read_line().map_err(misuse)?;
    Ok(match line {
        Some(line) => Object::String(line),
        None => Object::Nil,
    })
}

fn fwrite(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let handle = file_arg("fwrite", &args, 0)?;
    let text = string_arg("fwrite", &args, 1)?;

    let count = handle.borrow_mut().write(&text).map_err(misuse)?;
    Ok(Object::Number(count as f64))
}

fn fwriteline(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let handle = file_arg("fwriteline", &args, 0)?;
    let text = string_arg("fwriteline", &args, 1)?;

    let count = handle.borrow_mut().write(&format!("{text}\n")).map_err(misuse)?;
    Ok(Object::Number(count as f64))
}

fn fexists(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let path = string_arg("fexists", &args, 0)?;
    Ok(Object::Bool(Path::new(&path).exists()))
}

fn fsize(_: &mut Interpreter, args: Vec<Object>) -> Result<Object, RuntimeError> {
    let path = string_arg("fsize", &args, 0)?;
    match fs::metadata(&path) {
        Ok(metadata) => Ok(Object::Number(metadata.len() as f64)),
        Err(_) => Err(misuse(format!("fsize: cannot stat '{path}'"))),
    }
}
