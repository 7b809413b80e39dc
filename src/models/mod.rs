mod preference;
mod record;

pub use preference::Preference;
pub use record::Record;

#[cfg(test)]
mod tests;
