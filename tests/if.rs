#[macro_use]
mod common;

#[cfg(test)]
mod if_stmt {
    tests! {
        if_else in if is OK
        "then"
        "else"
        "no-else"
    }

    tests! {
        dangling_else in if is OK
        "nearest"
    }

    tests! {
        truthiness in if is OK
        "zero is falsy"
        "nil is falsy"
        "empty string is truthy"
        "nonzero is truthy"
    }
}
