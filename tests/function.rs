#[macro_use]
mod common;

#[cfg(test)]
mod function {
    tests! {
        factorial in function is OK
        "120"
    }

    tests! {
        fib in function is OK
        "55"
    }

    tests! {
        nil_return in function is OK
        "nil"
    }

    tests! {
        params in function is OK
        "x,y,z"
    }

    tests! {
        first_class in function is OK
        "5"
    }

    tests! {
        display in function is OK
        "<fn f>"
        "<native fn len>"
    }

    tests! {
        arity in function is ERR
        "Runtime Error in tests/scripts/function/arity.ms at line 2: Expected 1 arguments but got 2"
    }

    tests! {
        not_callable in function is ERR
        "Runtime Error in tests/scripts/function/not_callable.ms at line 2: number type is not callable"
    }
}
