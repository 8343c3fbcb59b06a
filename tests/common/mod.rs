#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use miniscript_lang::MiniScript;

            let mut expected: Vec<&str> = vec![$($expected),*];

            // if exists, concat expected lines with new lines
            let expected = match expected.len() {
                0 => "".to_string(),
                _ => {
                    // add empty string to end to add new line to end of output
                    expected.push("");
                    expected.join("\n")
                }
            };

            let mut output = Vec::new();
            let mut miniscript = MiniScript::new(&mut output);

            let code = miniscript.run_file(
                &format!("tests/scripts/{}/{}.ms", stringify!($scope), stringify!($file)),
            );
            assert_eq!(code, 0);

            // drop miniscript here to release the borrow on output
            drop(miniscript);
            assert_eq!(expected, std::str::from_utf8(&output).unwrap());
        }
    };

    ($file:ident in $scope:ident is ERR $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            // output concats expected with new line
            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/scripts/{}/{}.ms", stringify!($scope), stringify!($file));

            Command::cargo_bin("miniscript").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .failure();
        }
    };
}
