mod common;

use common::ScratchDir;
use harbor::static_files::{NotFoundReason, PathResolver, Resolution};

#[test]
fn test_resolver_rejects_missing_root() {
    let dir = ScratchDir::new("resolver-missing");
    assert!(PathResolver::new(dir.path().join("nope")).is_err());
}

#[test]
fn test_resolver_rejects_file_root() {
    let dir = ScratchDir::new("resolver-file");
    let file = dir.write("a.txt", b"hi");
    assert!(PathResolver::new(file).is_err());
}

#[test]
fn test_normalize_collapses_dot_segments() {
    let dir = ScratchDir::new("resolver-normalize");
    let resolver = PathResolver::new(dir.path()).unwrap();
    let root = resolver.root().to_path_buf();

    assert_eq!(resolver.normalize("/a/./b/../c.txt"), root.join("a/c.txt"));
    assert_eq!(resolver.normalize("//a//b"), root.join("a/b"));
    assert_eq!(resolver.normalize("/"), root);
    assert!(!resolver.contains(&resolver.normalize("/../x")));
}

#[tokio::test]
async fn test_resolve_existing_file() {
    let dir = ScratchDir::new("resolver-found");
    dir.write("docs/a.txt", b"hello");
    let resolver = PathResolver::new(dir.path()).unwrap();

    match resolver.resolve("/docs/a.txt").await {
        Resolution::Found(file) => {
            assert_eq!(file.path, resolver.root().join("docs/a.txt"));
            assert_eq!(file.len, 5);
            assert!(file.modified.is_some());
        }
        other => panic!("expected file, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_missing_and_directory() {
    let dir = ScratchDir::new("resolver-notfound");
    dir.mkdir("sub");
    let resolver = PathResolver::new(dir.path()).unwrap();

    assert_eq!(
        resolver.resolve("/missing").await,
        Resolution::NotFound(NotFoundReason::Missing)
    );
    assert_eq!(
        resolver.resolve("/sub").await,
        Resolution::NotFound(NotFoundReason::Directory)
    );
    assert_eq!(
        resolver.resolve("/").await,
        Resolution::NotFound(NotFoundReason::Directory)
    );
}

#[tokio::test]
async fn test_resolve_traversal_escapes_root() {
    let outer = ScratchDir::new("resolver-traversal");
    outer.write("secret.txt", b"secret");
    let root = outer.mkdir("www");
    let resolver = PathResolver::new(&root).unwrap();

    assert_eq!(
        resolver.resolve("/../secret.txt").await,
        Resolution::NotFound(NotFoundReason::EscapesRoot)
    );
    assert_eq!(
        resolver.resolve("/a/../../secret.txt").await,
        Resolution::NotFound(NotFoundReason::EscapesRoot)
    );
}

#[tokio::test]
async fn test_resolve_sibling_with_root_prefix_is_rejected() {
    let outer = ScratchDir::new("resolver-sibling");
    let root = outer.mkdir("www");
    outer.write("www2/leak.txt", b"leak");
    let resolver = PathResolver::new(&root).unwrap();

    assert_eq!(
        resolver.resolve("/../www2/leak.txt").await,
        Resolution::NotFound(NotFoundReason::EscapesRoot)
    );
}

#[tokio::test]
async fn test_resolve_traversal_back_into_root() {
    let outer = ScratchDir::new("resolver-reenter");
    let root = outer.mkdir("www");
    outer.write("www/a.txt", b"hi");
    let resolver = PathResolver::new(&root).unwrap();

    assert!(matches!(
        resolver.resolve("/../www/a.txt").await,
        Resolution::Found(_)
    ));
}
