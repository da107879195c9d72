pub mod audit;
pub mod constants;
pub mod revalidation;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
