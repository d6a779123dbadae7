//! End-to-end reconciliation scenarios against a real directory tree.

use linqmirror_core::{
    EntryFilter, FsDirectoryReader, IncrementalInserter, Insertion, MatchMode, MemoryProject,
    NodeKind, ProjectMirrorSink, TreeBuilder, TreeNode,
};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Root with `notes.txt`, `report.linq`, `drivers/d1.xml`, `random/r1.linq`,
/// and a project that only knows about `drivers`.
fn snapshot() -> (TempDir, MemoryProject) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("notes.txt"), "").unwrap();
    fs::write(root.join("report.linq"), "").unwrap();
    fs::create_dir(root.join("drivers")).unwrap();
    fs::write(root.join("drivers").join("d1.xml"), "").unwrap();
    fs::create_dir(root.join("random")).unwrap();
    fs::write(root.join("random").join("r1.linq"), "").unwrap();

    let mut project = MemoryProject::new("LINQPad", root);
    project.add_folder(project.root_handle(), "drivers").unwrap();
    (dir, project)
}

fn names(node: &TreeNode) -> Vec<&str> {
    node.children.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn build_mirrors_allow_listed_content_only() {
    let (dir, mut project) = snapshot();
    let mut tree = project.mirror_tree();
    let reader = FsDirectoryReader::default();
    let filter = EntryFilter::default();

    let summary = TreeBuilder::new(&reader, &filter)
        .build(dir.path(), &mut tree, &mut project)
        .unwrap();

    let mut root_names = names(&tree);
    root_names.sort();
    assert_eq!(root_names, vec!["drivers", "report.linq"]);

    let drivers = tree.find_folder(&dir.path().join("drivers")).unwrap();
    assert_eq!(names(drivers), vec!["d1.xml"]);

    assert!(tree.find_folder(&dir.path().join("random")).is_none());
    assert!(tree
        .walk()
        .all(|(_, n)| n.name != "r1.linq" && n.name != "notes.txt"));

    assert_eq!(summary.files_added, 2);
    assert_eq!(summary.folders_mirrored, 1);
    // Every mirrored node is backed by a project item.
    for (_, node) in tree.walk() {
        let item = project.item(node.handle).unwrap();
        assert_eq!(item.name, node.name);
    }
}

#[test]
fn loose_mode_mirrors_substring_matches() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("odd.x"), "").unwrap();
    fs::write(root.join("notes.txt"), "").unwrap();
    fs::create_dir(root.join("my-queries")).unwrap();
    fs::write(root.join("my-queries").join("q.linq"), "").unwrap();

    let mut project = MemoryProject::new("LINQPad", root);
    project.add_folder(project.root_handle(), "my-queries").unwrap();

    let reader = FsDirectoryReader::default();

    let exact = EntryFilter::default();
    let mut tree = project.mirror_tree();
    let mut exact_project = project.clone();
    TreeBuilder::new(&reader, &exact)
        .build(root, &mut tree, &mut exact_project)
        .unwrap();
    assert_eq!(tree.file_count(), 0);

    let loose = EntryFilter::default().with_mode(MatchMode::Loose);
    let mut tree = project.mirror_tree();
    TreeBuilder::new(&reader, &loose)
        .build(root, &mut tree, &mut project)
        .unwrap();
    assert_eq!(tree.file_count(), 2);
    assert!(tree.has_file(&root.join("odd.x")));
    assert!(!tree.has_file(&root.join("notes.txt")));
}

#[test]
fn created_file_attaches_under_matching_folder() {
    let dir = tempdir().unwrap();
    let queries = dir.path().join("Queries");
    fs::create_dir(&queries).unwrap();

    let mut project = MemoryProject::new("LINQPad", dir.path());
    let queries_handle = project.add_folder(project.root_handle(), "Queries").unwrap();
    let mut tree = project.mirror_tree();
    let filter = EntryFilter::default();

    let created = queries.join("a.linq");
    fs::write(&created, "").unwrap();
    let result = IncrementalInserter::new(&filter)
        .insert_created(&created, &mut tree, &mut project)
        .unwrap();

    assert!(matches!(result, Insertion::Attached { ref folder, .. } if folder == &queries));
    let node = tree.find_folder(&queries).unwrap();
    assert_eq!(names(node), vec!["a.linq"]);
    assert!(!tree.has_file(&created));
    assert_eq!(project.children(queries_handle).len(), 1);
}

#[test]
fn created_file_without_folder_falls_back_to_root() {
    let dir = tempdir().unwrap();
    let plugins = dir.path().join("plugins");
    fs::create_dir(&plugins).unwrap();

    let mut project = MemoryProject::new("LINQPad", dir.path());
    let mut tree = project.mirror_tree();
    let filter = EntryFilter::default();

    let created = plugins.join("p.linq");
    fs::write(&created, "").unwrap();
    let result = IncrementalInserter::new(&filter)
        .insert_created(&created, &mut tree, &mut project)
        .unwrap();

    assert!(matches!(result, Insertion::AtRoot { .. }));
    assert!(tree.has_file(&created));
    assert_eq!(tree.children[0].kind, NodeKind::File);
}

#[test]
fn created_twice_yields_two_leaves() {
    let dir = tempdir().unwrap();
    let created = dir.path().join("twice.linq");
    fs::write(&created, "").unwrap();

    let mut project = MemoryProject::new("LINQPad", dir.path());
    let mut tree = project.mirror_tree();
    let filter = EntryFilter::default();
    let inserter = IncrementalInserter::new(&filter);

    let first = inserter.insert_created(&created, &mut tree, &mut project).unwrap();
    let second = inserter.insert_created(&created, &mut tree, &mut project).unwrap();

    assert_ne!(first.handle(), second.handle());
    assert_eq!(tree.children.len(), 2);
    assert!(tree.children.iter().all(|c| c.full_path == created));
}

#[test]
fn filters_agree_between_builder_and_inserter() {
    let dir = tempdir().unwrap();
    let filter = EntryFilter::default();
    let reader = FsDirectoryReader::default();

    for name in ["a.linq", "b.xml", "c.LINQ", "d.txt", "e.dll", "f"] {
        let path = dir.path().join(name);
        fs::write(&path, "").unwrap();
    }

    let mut built_project = MemoryProject::new("LINQPad", dir.path());
    let mut built = built_project.mirror_tree();
    TreeBuilder::new(&reader, &filter)
        .build(dir.path(), &mut built, &mut built_project)
        .unwrap();

    let mut inserted_project = MemoryProject::new("LINQPad", dir.path());
    let mut inserted = inserted_project.mirror_tree();
    let inserter = IncrementalInserter::new(&filter);
    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        inserter
            .insert_created(&path, &mut inserted, &mut inserted_project)
            .unwrap();
    }

    let mut built_names = names(&built);
    let mut inserted_names = names(&inserted);
    built_names.sort();
    inserted_names.sort();
    assert_eq!(built_names, vec!["a.linq", "b.xml", "c.LINQ"]);
    assert_eq!(built_names, inserted_names);
}

#[test]
fn remove_deleted_never_mutates() {
    let (dir, mut project) = snapshot();
    let mut tree = project.mirror_tree();
    let reader = FsDirectoryReader::default();
    let filter = EntryFilter::default();
    TreeBuilder::new(&reader, &filter)
        .build(dir.path(), &mut tree, &mut project)
        .unwrap();

    let tree_before = tree.clone();
    let project_before = project.clone();
    let inserter = IncrementalInserter::new(&filter);
    for path in [
        dir.path().join("report.linq"),
        dir.path().join("drivers").join("d1.xml"),
        dir.path().join("drivers"),
        Path::new("/elsewhere/x.linq").to_path_buf(),
    ] {
        inserter.remove_deleted(&path, &tree);
    }

    assert_eq!(tree, tree_before);
    assert_eq!(project, project_before);
}
