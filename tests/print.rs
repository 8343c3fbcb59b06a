#[macro_use]
mod common;

#[cfg(test)]
mod print_stmt {
    tests! {
        multi in print is OK
        "1 two 3.5 true nil"
    }

    tests! {
        missing_expression in print is ERR
        "Parse Error in tests/scripts/print/missing_expression.ms at line 1: Expect expression (at ';')"
    }
}
