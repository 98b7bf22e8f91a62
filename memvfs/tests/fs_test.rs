use memvfs::alloc::State;
use memvfs::{NodeKind, Vfs, VfsConfig, VfsError};

fn tiny_disk() -> Vfs {
    Vfs::new(VfsConfig::new().with_total_blocks(4).with_block_size(2)).unwrap()
}

#[test]
fn rewrites_are_bounded_by_free_plus_held_blocks() {
    let mut fs = tiny_disk();
    fs.create("f").unwrap();

    fs.write("f", b"abcd").unwrap();
    assert_eq!(fs.metadata("f").unwrap().block_count, 2);

    fs.write("f", b"abcdefgh").unwrap();
    assert_eq!(fs.read("f").unwrap(), b"abcdefgh".to_vec());
    assert_eq!(fs.usage().free_blocks, 0);

    let err = fs.write("f", b"123456789").unwrap_err();
    assert!(matches!(err, VfsError::InsufficientSpace { required: 5, .. }));
    assert_eq!(fs.read("f").unwrap(), b"abcdefgh".to_vec());
    assert_eq!(fs.metadata("f").unwrap().size, 8);
}

#[test]
fn rmdir_requires_an_empty_directory() {
    let mut fs = tiny_disk();
    fs.mkdir("x").unwrap();
    assert!(matches!(fs.mkdir("x"), Err(VfsError::AlreadyExists(_))));

    fs.create("x/y").unwrap();
    assert!(matches!(fs.rmdir("x"), Err(VfsError::NotEmpty(_))));

    fs.delete("x/y").unwrap();
    fs.rmdir("x").unwrap();
    assert!(matches!(fs.resolve("x"), Err(VfsError::NotFound(_))));
}

#[test]
fn delete_returns_exactly_the_files_blocks() {
    let mut fs = Vfs::new(VfsConfig::new().with_total_blocks(32).with_block_size(8)).unwrap();
    fs.create("keep").unwrap();
    fs.write("keep", &[7; 20]).unwrap();
    fs.create("drop").unwrap();
    fs.write("drop", &[9; 41]).unwrap();

    let held = fs.metadata("drop").unwrap().block_count;
    assert_eq!(held, 6);
    let free_before = fs.usage().free_blocks;

    fs.delete("drop").unwrap();
    assert_eq!(fs.usage().free_blocks, free_before + held);
    assert_eq!(fs.read("keep").unwrap(), vec![7; 20]);
}

#[test]
fn relative_and_dotted_paths_reach_the_same_directory() {
    let mut fs = tiny_disk();
    fs.mkdir("a").unwrap();
    fs.mkdir("a/b").unwrap();

    fs.cd("/a/b/../b").unwrap();
    let dotted = fs.cwd();
    fs.cd("/").unwrap();
    fs.cd("/a/b").unwrap();
    assert_eq!(fs.cwd(), dotted);
    assert_eq!(fs.pwd(), "/a/b");

    assert!(matches!(fs.cd("/a/nope"), Err(VfsError::NotFound(c)) if c == "nope"));
    assert_eq!(fs.pwd(), "/a/b");
}

#[test]
fn full_capacity_round_trips() {
    let mut fs = Vfs::new(VfsConfig::new().with_total_blocks(16).with_block_size(16)).unwrap();
    fs.create("f").unwrap();
    let capacity = 16 * 16;

    for len in [0, 1, 15, 16, 17, 100, capacity - 1, capacity] {
        let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        fs.write("f", &bytes).unwrap();
        assert_eq!(fs.read("f").unwrap(), bytes);
    }
    assert_eq!(fs.usage().free_blocks, 0);

    assert!(fs.write("f", &vec![0; capacity + 1]).is_err());
}

#[test]
fn blocks_are_owned_by_exactly_one_file_or_free() {
    let mut fs = Vfs::new(VfsConfig::new().with_total_blocks(24).with_block_size(4)).unwrap();
    fs.mkdir("d").unwrap();
    let files = ["a", "b", "d/c", "d/e"];
    for name in files.iter() {
        fs.create(name).unwrap();
    }

    let payloads: [&[u8]; 6] = [b"0123456789", b"", b"xyz", b"a much longer payload", b"q", b"12345678"];
    for (round, payload) in payloads.iter().enumerate() {
        let name = files[round % files.len()];
        fs.write(name, payload).unwrap();
        if round == 3 {
            fs.delete("b").unwrap();
            fs.create("b").unwrap();
        }

        let mut owners = vec![0; 24];
        for name in files.iter() {
            let id = fs.resolve(name).unwrap();
            let extent = fs.namespace().extent(id).unwrap();
            for &blocknr in extent.blocks() {
                owners[blocknr] += 1;
                assert_eq!(fs.disk().allocator().get(blocknr), State::Used);
            }
        }
        for (blocknr, &count) in owners.iter().enumerate() {
            match fs.disk().allocator().get(blocknr) {
                State::Used => assert_eq!(count, 1),
                State::Free => assert_eq!(count, 0),
            }
        }
    }
}

#[test]
fn nested_tree_listing_and_teardown() {
    let mut fs = tiny_disk();
    fs.mkdir("src").unwrap();
    fs.cd("src").unwrap();
    fs.mkdir("bin").unwrap();
    fs.create("../README").unwrap();
    fs.write("/README", b"hi").unwrap();

    let names: Vec<_> = fs
        .list("/")
        .unwrap()
        .into_iter()
        .map(|e| (e.name, e.kind))
        .collect();
    assert_eq!(
        names,
        vec![
            ("src".to_string(), NodeKind::Directory),
            ("README".to_string(), NodeKind::File),
        ]
    );

    fs.teardown();
    assert_eq!(fs.usage().used_blocks, 0);
    assert!(fs.list("/").unwrap().is_empty());
}

#[test]
fn teardown_after_descending_a_deep_chain() {
    let mut fs = tiny_disk();
    for _ in 0..20_000 {
        fs.mkdir("d").unwrap();
        fs.cd("d").unwrap();
    }
    fs.create("f").unwrap();
    fs.write("f", b"deep").unwrap();
    assert_eq!(fs.usage().used_blocks, 2);

    fs.teardown();
    assert_eq!(fs.usage().used_blocks, 0);
    assert_eq!(fs.cwd(), fs.root());
    assert!(fs.list("/").unwrap().is_empty());
}
