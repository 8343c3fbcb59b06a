#[macro_use]
mod common;

#[cfg(test)]
mod for_stmt {
    tests! {
        basic in for is OK
        "0"
        "1"
        "2"
    }

    tests! {
        expr_init in for is OK
        "0"
        "1"
        "2"
    }

    tests! {
        nested in for is OK
        "0-0"
        "0-1"
        "1-0"
        "1-1"
    }

    tests! {
        scope in for is ERR
        "Runtime Error in tests/scripts/for/scope.ms at line 2: Undefined variable 'i'"
    }
}
