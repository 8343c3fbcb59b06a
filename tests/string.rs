#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        concat in string is OK
        "Hello, World"
        "5"
    }

    tests! {
        escape in string is OK
        "tab\there"
        "line1"
        "line2"
        "quote\"quote"
        "back\\slash"
    }

    tests! {
        char in string is OK
        "x"
        "ab"
        "1"
    }

    tests! {
        unterminated in string is ERR
        "Lex Error in tests/scripts/string/unterminated.ms at line 1: Unterminated string"
    }

    tests! {
        bad_escape in string is ERR
        "Lex Error in tests/scripts/string/bad_escape.ms at line 1: Unknown escape sequence '\\q'"
    }
}
