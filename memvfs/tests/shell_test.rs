use std::io::{BufReader, Write};

use memvfs::cmd::BANNER;
use memvfs::{Shell, Vfs, VfsConfig};
use tempfile::NamedTempFile;

fn run_script(script: &str, config: VfsConfig) -> String {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(script.as_bytes()).unwrap();
    file.flush().unwrap();

    let mut shell = Shell::new(Vfs::new(config).unwrap());
    let mut output = Vec::new();
    shell
        .run(BufReader::new(file.reopen().unwrap()), &mut output, false)
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn capacity_scenario_from_a_script_file() {
    let script = "\
create f
write f \"abcd\"
write f \"abcdefgh\"
read f
write f \"123456789\"
read f
df
exit
";
    let output = run_script(
        script,
        VfsConfig::new().with_total_blocks(4).with_block_size(2),
    );
    let expected = format!(
        "{}
File 'f' created
Data written (4 bytes) to /f
Data written (8 bytes) to /f
abcdefgh
Error: not enough disk space
abcdefgh
Total Blocks: 4
Used Blocks: 4
Free Blocks: 0
Disk Usage: 100.00%
Memory released. Exiting...
",
        BANNER
    );
    assert_eq!(output, expected);
}

#[test]
fn directory_scenario_from_a_script_file() {
    let script = "\
mkdir x
mkdir x
create x/y
rmdir x
delete x/y
rmdir x
ls
";
    let output = run_script(script, VfsConfig::default());
    let expected = format!(
        "{}
Directory 'x' created
Error: directory 'x' already exists
File 'x/y' created
Error: directory not empty
File 'x/y' deleted
Directory 'x' removed
(empty)
",
        BANNER
    );
    assert_eq!(output, expected);
}

#[test]
fn navigation_from_a_script_file() {
    let script = "\
mkdir a

cd a
mkdir b
cd /a/b/../b
pwd
cd missing
pwd
cd ..
ls
";
    let output = run_script(script, VfsConfig::default());
    let expected = format!(
        "{}
Directory 'a' created
Moved to /a
Directory 'b' created
Moved to /a/b
/a/b
Error: path component 'missing' not found
/a/b
Moved to /a
b/
",
        BANNER
    );
    assert_eq!(output, expected);
}
