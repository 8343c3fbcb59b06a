#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        declare in variable is OK
        "1"
        "nil"
    }

    tests! {
        implicit_global in variable is OK
        "30"
    }

    tests! {
        implicit_global_in_function in variable is OK
        "42"
    }

    tests! {
        assign_outer in variable is OK
        "2"
    }

    tests! {
        shadow in variable is OK
        "local"
        "global"
    }

    tests! {
        redefine in variable is OK
        "two"
    }

    tests! {
        undefined in variable is ERR
        "Runtime Error in tests/scripts/variable/undefined.ms at line 1: Undefined variable 'undef'"
    }
}
