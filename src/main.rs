#![allow(non_snake_case)]
use RustedBVP::Examples::bvp_fd_examples::bvp_fd_examples;

fn main() {
    // example number may be passed as the first argument
    let example = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<usize>().ok())
        .unwrap_or(0);
    bvp_fd_examples(example);
}
