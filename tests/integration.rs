use tinysh::eval::{VariableStore, Variables};
use tinysh::exec::testing::RecordingBackend;

/// Run a whole program against a fresh recorder.
fn run_script(script: &str) -> (i32, RecordingBackend) {
    let mut vars = Variables::new();
    let mut backend = RecordingBackend::new();
    let status = tinysh::run(script, &mut vars, &mut backend)
        .unwrap_or_else(|e| panic!("parse failed for {script:?}: {e}"));
    (status, backend)
}

fn output_for(script: &str) -> String {
    run_script(script).1.stdout()
}

fn status_for(script: &str) -> i32 {
    run_script(script).0
}

macro_rules! output_test {
    ($name:ident, $script:expr, $expected:expr) => {
        #[test]
        fn $name() {
            assert_eq!(output_for($script), $expected, "script: {}", $script);
        }
    };
}

macro_rules! status_test {
    ($name:ident, $script:expr, $status:expr) => {
        #[test]
        fn $name() {
            assert_eq!(status_for($script), $status, "script: {}", $script);
        }
    };
}

macro_rules! parse_error_test {
    ($name:ident, $script:expr) => {
        #[test]
        fn $name() {
            let mut vars = Variables::new();
            let mut backend = RecordingBackend::new();
            let result = tinysh::run($script, &mut vars, &mut backend);
            assert!(result.is_err(), "expected parse error for {:?}", $script);
            assert!(backend.invocations().is_empty(), "nothing may run: {}", $script);
        }
    };
}

// ── Words, quoting, variables ──

output_test!(echo_words, "echo hello world", "hello world\n");
output_test!(echo_double_quoted, r#"echo "a  b""#, "a  b\n");
output_test!(echo_escaped_quote, r#"echo "a\"b""#, "a\"b\n");
output_test!(echo_tab_escape, r#"echo "x\ty""#, "x\ty\n");
output_test!(echo_single_quoted, r#"echo 'it\'s'"#, "it's\n");
output_test!(echo_single_quoted_backslash, r#"echo 'a\\'"#, "a\\\n");
output_test!(comment_ignored, "echo a # not an argument", "a\n");
output_test!(newline_is_whitespace, "echo a\necho b", "a echo b\n");
output_test!(variable_expands, "a = hi; echo $a", "hi\n");
output_test!(braced_variable_expands, "a = hi; echo ${a}", "hi\n");
output_test!(unset_variable_is_empty, "echo a $nothing b", "a  b\n");
output_test!(assignment_from_string, r#"a = "two words"; echo $a"#, "two words\n");
output_test!(reassignment_overwrites, "a = 1; a = 2; echo $a", "2\n");
output_test!(status_variable, "false; echo $?", "1\n");
output_test!(status_variable_after_success, "false; true; echo $?", "0\n");
output_test!(equals_as_argument, "echo a = b", "a = b\n");

// ── Chains ──

output_test!(and_runs_on_success, "true && echo yes", "yes\n");
output_test!(and_skips_on_failure, "false && echo yes", "");
output_test!(or_runs_on_failure, "false || echo fallback", "fallback\n");
output_test!(or_skips_on_success, "true || echo fallback", "");
output_test!(long_and_chain, "echo a && echo b && echo c", "a\nb\nc\n");
output_test!(background_then_next, "echo bg & echo fg", "bg\nfg\n");

// ── Control flow ──

output_test!(if_then, "if true then echo yes fi", "yes\n");
output_test!(if_else, "if false then echo yes else echo no fi", "no\n");
output_test!(if_no_branch_taken, "if false then echo yes fi", "");
output_test!(if_test_n, r#"if [ -n "x" ] then echo set else echo empty fi"#, "set\n");
output_test!(if_test_z_unset, "if [ -z $u ] then echo empty fi", "empty\n");
output_test!(if_string_equal, "a = x; if [ $a = x ] then echo same fi", "same\n");
output_test!(if_string_differ, "if [ a != b ] then echo differ fi", "differ\n");
output_test!(if_test_word, "if test word then echo nonempty fi", "nonempty\n");
output_test!(if_test_list, "if false; true then echo last_wins fi", "last_wins\n");
output_test!(if_then_semicolon, "if true then echo a fi; echo b", "a\nb\n");
output_test!(for_each_word, "for v in a b c do echo $v done", "a\nb\nc\n");
output_test!(for_empty_in, "for v in do echo $v done", "");
output_test!(for_body_list, "for v in 1 2 do echo x; echo $v done", "x\n1\nx\n2\n");
output_test!(
    for_nested_if,
    "for v in a b do if [ $v = b ] then echo found fi done",
    "found\n"
);
output_test!(
    for_nested_for,
    "for a in 1 2 do for b in x y do echo $a $b done done",
    "1 x\n1 y\n2 x\n2 y\n"
);
output_test!(
    while_until_test_fails,
    "n = a; while [ $n = a ] do echo once; n = b done",
    "once\n"
);
output_test!(while_false_skips_body, "while false do echo never done", "");

// ── Substitution ──

output_test!(tick_argument, "echo `echo hi` there", "hi there\n");
output_test!(tick_assignment, "x = `echo inner`; echo $x", "inner\n");
output_test!(tick_pipeline, "`echo direct`", "direct\n");
output_test!(tick_multi_line, "x = `seq 1 3`; echo $x", "1\n2\n3\n");
output_test!(tick_sets_variables, "x = `y = side; echo v`; echo $x $y", "v side\n");
output_test!(tick_in_if_test, "if [ `echo a` = a ] then echo match fi", "match\n");

// ── Builtins ──

output_test!(seq_range, "seq 1 3", "1\n2\n3\n");
output_test!(seq_hex, "seq 0x9 0xb", "9\n10\n11\n");
output_test!(seq_octal, "seq 07 010", "7\n8\n");
output_test!(seq_empty_range, "seq 3 1", "");

// ── Statuses ──

status_test!(status_empty_program, "", 0);
status_test!(status_true, "true", 0);
status_test!(status_false, "false", 1);
status_test!(status_not_found, "no-such-command-here", 127);
status_test!(status_assignment, "false; a = 1", 0);
status_test!(status_and_failure, "true && false", 1);
status_test!(status_or_failure, "false || false", 1);
status_test!(status_if_untaken, "if false then true fi", 1);
status_test!(status_if_branch, "if true then false fi", 1);
status_test!(status_for_no_words, "for v do false done", 0);
status_test!(status_for_last_body, "for v in a b do false done", 1);
status_test!(status_while_never_ran, "while false do false done", 0);
status_test!(status_test_false, "[ a = b ]", 1);
status_test!(status_test_malformed, "[ a", 2);
status_test!(status_seq_bad_number, "seq x 1", 1);
status_test!(status_tick_pipeline, "`true; false`", 1);

// ── Parse errors: nothing runs ──

parse_error_test!(error_pipe, "echo a | wc");
parse_error_test!(error_if_without_fi, "if true then echo a");
parse_error_test!(error_if_without_then, "if true echo a fi");
parse_error_test!(error_then_empty, "if true then fi");
parse_error_test!(error_for_keyword_variable, "for in a do echo done");
parse_error_test!(error_for_without_done, "for v in a do echo $v");
parse_error_test!(error_while_without_do, "while true echo done");
parse_error_test!(error_redirect_without_target, "echo >");
parse_error_test!(error_dangling_and, "echo a &&");
parse_error_test!(error_unterminated_single, "echo 'open");
parse_error_test!(error_unterminated_double, "echo \"open");
parse_error_test!(error_unterminated_tick, "echo `open");
parse_error_test!(error_bad_substitution, "echo `if`");
parse_error_test!(error_stray_done, "done");
parse_error_test!(error_late_stray_keyword, "echo a; fi");
parse_error_test!(error_brace, "echo {x}");

// ── Invocation details ──

#[test]
fn redirects_are_resolved_and_passed() {
    let (_, backend) = run_script("f = in.txt; sort < $f > out.txt");
    let invocation = &backend.invocations()[0];
    assert_eq!(invocation.argv, vec!["sort"]);
    assert_eq!(invocation.input.as_deref(), Some("in.txt"));
    assert_eq!(invocation.output.as_deref(), Some("out.txt"));
    assert!(!invocation.background);
}

#[test]
fn later_redirect_replaces_earlier() {
    let (_, backend) = run_script("cmd > a > b");
    assert_eq!(backend.invocations()[0].output.as_deref(), Some("b"));
}

#[test]
fn background_is_passed() {
    let (_, backend) = run_script("sleep 10 &");
    assert!(backend.invocations()[0].background);
}

#[test]
fn tick_words_are_not_split() {
    let (_, backend) = run_script("for v in `seq 1 2` do echo $v done");
    assert_eq!(backend.commands(), vec!["seq 1 2", "echo 1\n2"]);
}

#[test]
fn scripted_command_status_drives_chain() {
    let mut vars = Variables::new();
    let mut backend = RecordingBackend::new().respond("healthcheck", 3, "");
    let status = tinysh::run("healthcheck || echo failed $?", &mut vars, &mut backend).unwrap();
    assert_eq!(status, 0);
    assert_eq!(backend.stdout(), "failed 3\n");
}

#[test]
fn scripted_output_is_substituted() {
    let mut vars = Variables::new();
    let mut backend = RecordingBackend::new().respond("whoami", 0, "alice\n");
    tinysh::run("user = `whoami`", &mut vars, &mut backend).unwrap();
    assert_eq!(vars.get("user").as_deref(), Some("alice"));
    assert!(backend.stdout().is_empty());
}

#[test]
fn variables_persist_across_runs() {
    let mut vars = Variables::new();
    let mut backend = RecordingBackend::new();
    tinysh::run("a = kept", &mut vars, &mut backend).unwrap();
    tinysh::run("echo $a", &mut vars, &mut backend).unwrap();
    assert_eq!(backend.stdout(), "kept\n");
}

#[test]
fn configured_variables_are_visible() {
    let mut config = tinysh::config::Config::default_config();
    config.variables.insert("greeting".into(), "hello".into());
    let mut vars = Variables::from_config(&config);
    let mut backend = RecordingBackend::new();
    tinysh::run("echo $greeting", &mut vars, &mut backend).unwrap();
    assert_eq!(backend.stdout(), "hello\n");
}

#[test]
fn printed_program_reparses_to_same_text() {
    let script = r#"a = "x y"; if [ -n $a ] then echo `echo yes` > out else echo no fi; for v in 1 2 do echo $v & done; while false do done"#;
    let first = tinysh::parse::parse(script).unwrap();
    let printed = first.to_string();
    let second = tinysh::parse::parse(&printed).unwrap();
    assert_eq!(second.to_string(), printed);
}

#[test]
fn printed_program_behaves_the_same() {
    let script = r#"x = "q\"t"; for v in a b do echo $v $x done"#;
    let printed = tinysh::parse::parse(script).unwrap().to_string();
    assert_eq!(output_for(script), output_for(&printed));
}

#[test]
fn json_dump_names_constructs() {
    let program = tinysh::parse::parse("if true then echo a fi").unwrap();
    let json = serde_json::to_value(&program).unwrap();
    let first = &json["pipelines"][0];
    assert!(first.get("If").is_some(), "json: {json}");
}

#[cfg(unix)]
#[test]
fn executor_runs_external_commands() {
    use tinysh::exec::Executor;

    let config = tinysh::config::Config::default_config();
    let mut vars = Variables::new();
    let mut executor = Executor::from_config(&config);
    let status = tinysh::run("x = `printf abc`; [ $x = abc ]", &mut vars, &mut executor).unwrap();
    assert_eq!(status, 0);
    assert_eq!(vars.get("x").as_deref(), Some("abc"));
}

#[test]
fn very_long_chain_runs_to_completion() {
    let script = format!("{}echo end", "true && ".repeat(20_000));
    let (status, backend) = run_script(&script);
    assert_eq!(status, 0);
    assert_eq!(backend.stdout(), "end\n");
    assert_eq!(backend.invocations().len(), 20_001);
}
