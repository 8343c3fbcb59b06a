#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    tests! {
        counter in closure is OK
        "1"
        "2"
    }

    tests! {
        capture_param in closure is OK
        "15"
    }

    tests! {
        shared_binding in closure is OK
        "7"
    }

    tests! {
        independent in closure is OK
        "1"
        "2"
        "1"
    }
}
