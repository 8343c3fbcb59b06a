#[macro_use]
mod common;

#[cfg(test)]
mod number {
    tests! {
        shape in number is OK
        "1"
        "1.5"
        "3"
        "3"
        "2.5"
        "0.75"
    }
}
