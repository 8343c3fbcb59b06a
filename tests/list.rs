#[macro_use]
mod common;

#[cfg(test)]
mod list {
    tests! {
        index in list is OK
        "20"
        "99"
        "3"
    }

    tests! {
        nested in list is OK
        "3"
        "[1, 9]"
    }

    tests! {
        print in list is OK
        "[1, 2.5, x, true, nil]"
        "[]"
    }

    tests! {
        element_exprs in list is OK
        "[2, 4, 3]"
    }

    tests! {
        index_set_result in list is OK
        "9"
    }

    tests! {
        out_of_range in list is ERR
        "Runtime Error in tests/scripts/list/out_of_range.ms at line 2: List index 3 is out of range (len 3)"
    }

    tests! {
        bad_index in list is ERR
        "Runtime Error in tests/scripts/list/bad_index.ms at line 2: List index must be a number, got string type"
    }

    tests! {
        fractional_index in list is ERR
        "Runtime Error in tests/scripts/list/fractional_index.ms at line 2: List index must be an integer"
    }

    tests! {
        not_list in list is ERR
        "Runtime Error in tests/scripts/list/not_list.ms at line 1: Cannot index number type"
    }
}
