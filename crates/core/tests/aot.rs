use jarsmith_api::AotInvocation;
use jarsmith_core::aot::{AotError, AotOrchestrator, build_arguments};
use std::path::Path;
use tempfile::tempdir;

fn invocation(root: &Path) -> AotInvocation {
    AotInvocation::builder()
        .main_class("com.x.App")
        .classes_output(root.join("generated/aotClasses"))
        .sources_output(root.join("generated/aotSources"))
        .resources_output(root.join("generated/aotResources"))
        .group_id("g")
        .artifact_id("a")
        .env_profiles(["dev", "test"])
        .extra_args([Some("--flag".to_string())])
        .build()
        .unwrap()
}

#[cfg(unix)]
#[test]
fn test_reference_argument_list() {
    let invocation = AotInvocation::builder()
        .main_class("com.x.App")
        .classes_output("/c")
        .sources_output("/s")
        .resources_output("/r")
        .group_id("g")
        .artifact_id("a")
        .env_profiles(["dev", "test"])
        .extra_args([Some("--flag".to_string())])
        .build()
        .unwrap();

    assert_eq!(
        build_arguments(&invocation),
        vec!["com.x.App", "/c", "/s", "g", "a", "", "--env=dev,test", "--flag"]
    );
}

/// Writes a shell script standing in for `java`. It is run through
/// `/bin/sh <script>` so it never needs the executable bit.
#[cfg(unix)]
fn fake_java(dir: &Path, body: &str) -> std::path::PathBuf {
    let script = dir.join("fake-java.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
    script
}

#[cfg(unix)]
#[test]
fn test_processor_receives_contract_after_main_class() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("args.txt");
    let script = fake_java(
        dir.path(),
        &format!(
            r#"printf '%s\n' "$@" > "{log}"
shift 3
mkdir -p "$2/com/x"
printf 'generated' > "$2/com/x/App__Aot.class"
exit 0"#,
            log = log.display()
        ),
    );

    let orchestrator = AotOrchestrator::new("/bin/sh")
        .jvm_args(vec![script.display().to_string()])
        .classpath(vec![dir.path().join("classes")]);
    let invocation = invocation(dir.path());
    let outputs = orchestrator.run(&invocation).unwrap();

    assert!(outputs.classes_dir().join("com/x/App__Aot.class").is_file());
    assert!(outputs.sources_dir().is_dir());
    assert!(outputs.resources_dir().is_dir());

    let logged = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = logged.lines().collect();
    assert_eq!(lines[0], "-cp");
    assert_eq!(lines[2], "org.noear.solon.aot.SolonAotProcessor");
    let expected = build_arguments(&invocation);
    assert_eq!(&lines[3..], expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[cfg(unix)]
#[test]
fn test_non_zero_exit_returns_no_outputs() {
    let dir = tempdir().unwrap();
    let script = fake_java(
        dir.path(),
        r#"shift 3
mkdir -p "$2/partial"
exit 3"#,
    );

    let orchestrator = AotOrchestrator::new("/bin/sh")
        .jvm_args(vec![script.display().to_string()])
        .classpath(vec![dir.path().join("classes")]);
    let invocation = invocation(dir.path());
    match orchestrator.run(&invocation) {
        Err(AotError::ProcessFailed { status }) => assert_eq!(status, Some(3)),
        other => panic!("expected a process failure, got {:?}", other),
    }
    assert!(!invocation.classes_output.exists());
    assert!(!invocation.sources_output.exists());
}

#[test]
fn test_missing_launcher_is_a_spawn_error() {
    let dir = tempdir().unwrap();
    let orchestrator = AotOrchestrator::new(dir.path().join("no-such-java"));
    let err = orchestrator.run(&invocation(dir.path())).unwrap_err();
    assert!(matches!(err, AotError::Spawn { .. }));
}
