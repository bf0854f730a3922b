/// Mints actor identifiers. Uniqueness is only as good as the source.
pub trait RandomSource: Send + Sync {
    fn string(&self, length: usize) -> String;
}
