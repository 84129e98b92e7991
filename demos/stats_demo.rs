use clap::Parser;
use clap::ValueEnum;
use long_hash::LongMap;
use rand::TryRngCore;
use rand::rngs::OsRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Keys {
    /// 1, 2, 3, ...
    Sequential,
    /// Uniformly random 64-bit keys.
    Random,
    /// Multiples of a large power of two.
    Strided,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'f', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    #[arg(short = 'k', long = "keys", value_enum, default_value_t = Keys::Sequential)]
    keys: Keys,
}

fn main() -> Result<(), long_hash::Error> {
    let args = Args::parse();

    println!(
        "Creating LongMap with target capacity {} and load factor {}",
        args.target_capacity, args.load_factor
    );

    let mut map: LongMap<u64> =
        LongMap::with_capacity_and_load_factor(args.target_capacity, args.load_factor)?;

    println!("Actual capacity: {}", map.capacity());
    println!("Table size: {}", map.table_size());
    println!("Filling map with {:?} keys...", args.keys);

    let mut rng = OsRng;
    let num_values = map.capacity();
    for i in 0..num_values as u64 {
        let key = match args.keys {
            Keys::Sequential => i + 1,
            Keys::Random => rng.try_next_u64().unwrap_or(i),
            Keys::Strided => (i + 1) << 20,
        };
        map.insert(key, i);
    }

    println!("Inserted {} values into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.table_size() as f64) * 100.0
    );

    map.probe_histogram().print();
    map.debug_stats().print();

    println!("Removing every other entry through a cursor...");
    let mut cursor = map.cursor();
    while cursor.has_next() {
        cursor.advance()?;
        if cursor.value().is_some_and(|v| v % 2 == 0) {
            cursor.remove()?;
        }
    }

    map.probe_histogram().print();
    map.debug_stats().print();

    let before = map.table_size();
    let trimmed = map.trim();
    println!(
        "Trim {}: table size {} -> {}",
        if trimmed { "succeeded" } else { "failed" },
        before,
        map.table_size()
    );

    Ok(())
}
