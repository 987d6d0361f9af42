//! Basic usage of the `block_pool` crate:
//!
//! * Initializing a pool.
//! * Allocating until the pool is exhausted.
//! * Writing to and reading from blocks.
//! * Releasing blocks and observing LIFO reuse.
//! * Destroying the pool.

use block_pool::BlockPool;

const BLOCK_COUNT: usize = 5;
const OBJECT_SIZE: usize = 256;

fn main() {
    let pool = BlockPool::new();
    println!("{}", pool.stat());

    pool.init(BLOCK_COUNT, OBJECT_SIZE).unwrap();
    println!("{}", pool.stat());

    // Allocate everything. Each allocation comes from the head of the free list and becomes the
    // head of the used list.
    let mut blocks = Vec::new();
    while let Ok(block) = pool.alloc() {
        let greeting = format!("block number {}", blocks.len());
        pool.write(block, 0, greeting.as_bytes()).unwrap();

        blocks.push(block);
        println!("allocated {block}: {}", pool.stat());
    }

    println!("pool exhausted after {} allocations", blocks.len());

    let first = blocks[0];
    let mut buffer = [0_u8; 14];
    pool.read(first, 0, &mut buffer).unwrap();
    println!("{first} holds {:?}", String::from_utf8_lossy(&buffer));

    // Releasing a block makes it the next one to be allocated.
    pool.release(first).unwrap();
    let again = pool.alloc().unwrap();
    println!("released {first} and allocated {again} in its place");

    // Releasing twice is reported, not fatal.
    pool.release(again).unwrap();
    if let Err(error) = pool.release(again) {
        println!("second release rejected: {error}");
    }

    for block in blocks.into_iter().skip(1) {
        pool.release(block).unwrap();
    }

    println!("{}", pool.stat());

    pool.destroy();
    println!("{}", pool.stat());
}
