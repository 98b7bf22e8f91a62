use memvfs::{Vfs, VfsConfig};

pub fn main() {
    // A 4 block disk of 2 byte blocks.
    let config = VfsConfig::new().with_total_blocks(4).with_block_size(2);
    let mut fs = Vfs::new(config).expect("should create");

    fs.mkdir("greetings").unwrap();
    fs.create("greetings/hello").unwrap();
    fs.write("greetings/hello", b"hi!").unwrap();

    let content = fs.read("/greetings/hello").unwrap();
    println!("{}", String::from_utf8_lossy(&content));
    println!("{:?}", fs.usage());
}
