pub mod logging;
pub mod mr;
pub mod mrapps;
pub mod mrrt;
pub mod util;

#[cfg(test)]
mod test_mr;
