use log::debug;

/// Accumulates formatted records into size-bounded chunks.
///
/// The bound counts bytes. A record never splits: when appending it would
/// push a non-empty chunk past the bound, the chunk is sealed first and the
/// record starts the next one, so a single oversized record still gets a
/// chunk of its own. A bound of 0 yields exactly one chunk.
#[derive(Debug)]
pub struct ChunkAssembler {
    bound: usize,
    current: String,
    sealed: Vec<String>,
}

impl ChunkAssembler {
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            current: String::new(),
            sealed: Vec::new(),
        }
    }

    /// The repository header goes into the first chunk and is never sealed
    /// on its own.
    pub fn push_header(&mut self, header: &str) {
        self.current.push_str(header);
    }

    pub fn push(&mut self, record: &str) {
        if self.bound > 0
            && !self.current.is_empty()
            && self.current.len() + record.len() > self.bound
        {
            self.seal();
        }
        self.current.push_str(record);
    }

    fn seal(&mut self) {
        debug!(
            "Sealing chunk {} ({} bytes)",
            self.sealed.len() + 1,
            self.current.len()
        );
        self.sealed.push(std::mem::take(&mut self.current));
    }

    /// Seals the last chunk and returns all of them. An empty stream still
    /// produces one (empty) chunk so the caller always has something to write.
    pub fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() || self.sealed.is_empty() {
            self.seal();
        }
        self.sealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(bound: usize, header: &str, records: &[&str]) -> Vec<String> {
        let mut assembler = ChunkAssembler::new(bound);
        assembler.push_header(header);
        for record in records {
            assembler.push(record);
        }
        assembler.finish()
    }

    #[test]
    fn test_zero_bound_is_single_chunk() {
        let records = ["a".repeat(500), "b".repeat(500)];
        let refs: Vec<&str> = records.iter().map(String::as_str).collect();
        let chunks = assemble(0, "head\n", &refs);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 1005);
    }

    #[test]
    fn test_seals_before_exceeding_bound() {
        let chunks = assemble(10, "", &["aaaa", "bbbb", "cccc", "dd"]);
        assert_eq!(chunks, vec!["aaaabbbb", "ccccdd"]);
    }

    #[test]
    fn test_oversized_record_gets_own_chunk() {
        let chunks = assemble(5, "", &["ab", "0123456789", "cd"]);
        assert_eq!(chunks, vec!["ab", "0123456789", "cd"]);
    }

    #[test]
    fn test_header_stays_with_first_record() {
        let chunks = assemble(8, "HEADER\n", &["x", "yy"]);
        assert_eq!(chunks, vec!["HEADER\nx", "yy"]);
    }

    #[test]
    fn test_empty_stream_yields_one_empty_chunk() {
        assert_eq!(assemble(100, "", &[]), vec![String::new()]);
    }

    #[test]
    fn test_concatenation_matches_unbounded_output() {
        let records: Vec<String> = (0..40)
            .map(|i| format!(">>> f{}.py [python]\n{}\n", i, "x".repeat(i * 7 % 53)))
            .collect();
        let refs: Vec<&str> = records.iter().map(String::as_str).collect();
        let largest = refs.iter().map(|r| r.len()).max().unwrap();
        let whole = assemble(0, "@repo u branch=b commit=c\n\n", &refs).concat();

        for bound in [1, 16, 64, 100, 1000] {
            let chunks = assemble(bound, "@repo u branch=b commit=c\n\n", &refs);
            assert_eq!(chunks.concat(), whole, "bound {}", bound);
            for chunk in &chunks[..chunks.len() - 1] {
                assert!(chunk.len() <= bound + largest, "bound {}", bound);
                assert!(!chunk.is_empty());
            }
        }
    }
}
