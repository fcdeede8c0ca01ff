use tuscan::filters::{classify, default_registry};

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[test]
fn s1_compile_with_output_and_options() {
    let registry = default_registry();
    let info = classify(&registry, &argv(&["gcc", "-c", "a.c", "-o", "a.o"])).unwrap();
    assert_eq!(info.inputs, vec!["a.c"]);
    assert_eq!(info.outputs, vec!["a.o"]);
    assert_eq!(info.options, vec!["-c"]);
}

#[test]
fn s4_preprocess_only_is_empty() {
    let registry = default_registry();
    let info = classify(&registry, &argv(&["gcc", "-E", "-o", "foo.i", "foo.c"])).unwrap();
    assert!(info.is_empty());
}

#[test]
fn s5_disallowed_arch_is_empty() {
    let registry = default_registry();
    let info = classify(&registry, &argv(&["clang", "-arch", "ppc", "-c", "x.c"])).unwrap();
    assert!(info.is_empty());
}

#[test]
fn archiver_invocation_is_classified() {
    let registry = default_registry();
    let info = classify(&registry, &argv(&["ar", "rcs", "lib.a", "a.o", "b.o"])).unwrap();
    assert_eq!(info.outputs, vec!["lib.a"]);
    assert_eq!(info.inputs, vec!["a.o", "b.o"]);
}

#[test]
fn cxx_invocation_uses_cxx_filter() {
    let registry = default_registry();
    let info = classify(&registry, &argv(&["g++", "-c", "a.cpp", "-o", "a.o"])).unwrap();
    assert_eq!(info.inputs, vec!["a.cpp"]);
    assert_eq!(info.outputs, vec!["a.o"]);
}

#[test]
fn unrecognized_binary_is_dropped() {
    let registry = default_registry();
    assert!(classify(&registry, &argv(&["ld", "-o", "a.out", "a.o"])).is_none());
}
