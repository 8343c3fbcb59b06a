#[macro_use]
mod common;

#[cfg(test)]
mod scanner {
    tests! {
        lone_amp in scanner is ERR
        "Lex Error in tests/scripts/scanner/lone_amp.ms at line 1: Unexpected character '&'"
    }

    tests! {
        lone_pipe in scanner is ERR
        "Lex Error in tests/scripts/scanner/lone_pipe.ms at line 1: Unexpected character '|'"
    }

    tests! {
        bad_char in scanner is ERR
        "Lex Error in tests/scripts/scanner/bad_char.ms at line 1: Unexpected character '#'"
    }
}
