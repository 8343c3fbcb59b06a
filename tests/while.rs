#[macro_use]
mod common;

#[cfg(test)]
mod while_stmt {
    tests! {
        count in while is OK
        "1"
        "2"
        "3"
    }

    tests! {
        false_never_runs in while is OK
        "done"
    }
}
