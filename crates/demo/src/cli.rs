use clap::Parser;

/// Walk through every traversal of an ordered sequence and print the results.
#[derive(Parser, Debug)]
#[command(name = "ordered-sequence-demo", version, about, long_about = None)]
pub struct Cli {
    /// Initial elements
    #[arg(long, value_delimiter = ',', default_value = "1,2,3")]
    pub elements: Vec<String>,

    /// Start index for the seeded reverse iterator
    #[arg(long, default_value_t = 2)]
    pub seed_index: usize,

    /// Length of the pre-sized sequence built at the end
    #[arg(long, default_value_t = 7)]
    pub presized_len: usize,
}
