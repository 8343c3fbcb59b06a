#[cfg(test)]
mod file {
    use miniscript_lang::MiniScript;

    fn run(source: &str) -> String {
        let mut output = Vec::new();
        let mut miniscript = MiniScript::new(&mut output);
        miniscript.run_source(source, "<test>").unwrap();

        drop(miniscript);
        String::from_utf8(output).unwrap()
    }

    fn run_err(source: &str) -> miniscript_lang::error::ScriptError {
        let mut output = Vec::new();
        let mut miniscript = MiniScript::new(&mut output);
        miniscript.run_source(source, "<test>").unwrap_err()
    }

    #[test]
    fn write_lines_then_read_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");
        let path = path.display();

        let source = format!(
            r#"
            var f = fopen("{path}", "w");
            fwriteline(f, "alpha");
            fwriteline(f, "beta");
            print fclose(f);

            var r = fopen("{path}", "r");
            print freadline(r);
            print freadline(r);
            print freadline(r);
            fclose(r);

            print fexists("{path}");
            print fsize("{path}");
            "#
        );

        assert_eq!(run(&source), "0\nalpha\nbeta\nnil\ntrue\n11\n");
    }

    #[test]
    fn fwrite_returns_the_byte_count_and_fread_reads_it_all() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whole.txt");
        let path = path.display();

        let source = format!(
            r#"
            var f = fopen("{path}", "w");
            print fwrite(f, "hello");
            fclose(f);

            var r = fopen("{path}", "r");
            print fread(r);
            fclose(r);
            "#
        );

        assert_eq!(run(&source), "5\nhello\n");
    }

    #[test]
    fn append_mode_extends_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let path = path.display();

        let source = format!(
            r#"
            var f = fopen("{path}", "w");
            fwriteline(f, "first");
            fclose(f);

            var a = fopen("{path}", "a");
            fwriteline(a, "second");
            fclose(a);

            var r = fopen("{path}", "r");
            print fread(r);
            fclose(r);
            "#
        );

        assert_eq!(run(&source), "first\nsecond\n\n");
    }

    #[test]
    fn fopen_missing_file_yields_nil() {
        assert_eq!(run(r#"print fopen("no/such/file/anywhere", "r");"#), "nil\n");
    }

    #[test]
    fn fexists_is_false_for_missing_files() {
        assert_eq!(run(r#"print fexists("no/such/file/anywhere");"#), "false\n");
    }

    #[test]
    fn writing_a_read_handle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readonly.txt");
        std::fs::write(&path, "content").unwrap();
        let path = path.display();

        let source = format!(
            r#"
            var r = fopen("{path}", "r");
            fwrite(r, "nope");
            "#
        );

        let error = run_err(&source);
        assert!(error.message.contains("is not open for writing"));
    }

    #[test]
    fn reading_a_closed_handle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.txt");
        std::fs::write(&path, "content").unwrap();
        let path = path.display();

        let source = format!(
            r#"
            var r = fopen("{path}", "r");
            fclose(r);
            fread(r);
            "#
        );

        let error = run_err(&source);
        assert!(error.message.contains("is closed"));
    }

    #[test]
    fn file_handles_print_opaquely() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shown.txt");
        std::fs::write(&path, "").unwrap();
        let path = path.display();

        let source = format!(r#"print fopen("{path}", "r");"#);
        assert_eq!(run(&source), format!("<file {path}>\n"));
    }
}
