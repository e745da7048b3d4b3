pub mod extractor;
pub mod handler;
pub mod model;
pub mod route;

#[cfg(test)]
mod test_util;
