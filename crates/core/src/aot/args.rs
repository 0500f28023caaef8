use jarsmith_api::AotInvocation;
use std::path::Path;

/// Positional arguments handed to the AOT processor:
///
/// `<main> <classes> <sources> <group> <artifact> <nativeBuildArgs|""> [--env=a,b] [extra...]`
///
/// The native-build-args slot is always present. `None` extra arguments are
/// dropped.
pub fn build_arguments(invocation: &AotInvocation) -> Vec<String> {
    let mut args = Vec::with_capacity(7 + invocation.extra_args.len());
    args.push(invocation.main_class.clone());
    args.push(absolute(&invocation.classes_output));
    args.push(absolute(&invocation.sources_output));
    args.push(invocation.group_id.clone());
    args.push(invocation.artifact_id.clone());
    args.push(invocation.native_build_args.clone().unwrap_or_default());

    if !invocation.env_profiles.is_empty() {
        let profiles: Vec<&str> = invocation.env_profiles.iter().map(String::as_str).collect();
        args.push(format!("--env={}", profiles.join(",")));
    }

    args.extend(invocation.extra_args.iter().flatten().cloned());
    args
}

fn absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
