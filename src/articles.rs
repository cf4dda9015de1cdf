
// imports
use rustc_hash::FxHashMap;


/// A main-namespace wiki article as found in the `page` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub external_id: u32, // page_id in the MediaWiki database dump
}

/// Articles indexed densely by encounter order, by title and by database id.
///
/// The `articles` vector is the primary store, an article's position in it is
/// its internal index. Both maps are derived from it.
#[derive(Debug, Default)]
pub struct ArticleRegistry {
    articles: Vec<Article>,
    by_title: FxHashMap<String, u32>,
    by_external_id: FxHashMap<u32, u32>,
}

impl ArticleRegistry {

    pub fn new() -> ArticleRegistry {
        Self::default()
    }

    /// Registers an article and returns its internal index.
    ///
    /// First seen wins: a repeated external id, or a title already owned by
    /// another id, returns the index of the existing article and registers
    /// nothing.
    pub fn register(&mut self, title: String, external_id: u32) -> usize {

        if let Some(index) = self.find_by_external_id(external_id) {
            return index
        }
        if let Some(index) = self.find_by_title(&title) {
            return index
        }

        let index = self.articles.len() as u32;
        self.by_title.insert(title.clone(), index);
        self.by_external_id.insert(external_id, index);
        self.articles.push(Article { title, external_id });
        index as usize
    }

    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        self.by_title.get(title).map(|i| *i as usize)
    }

    pub fn find_by_external_id(&self, external_id: u32) -> Option<usize> {
        self.by_external_id.get(&external_id).map(|i| *i as usize)
    }

    pub fn size(&self) -> usize {
        self.articles.len()
    }

    /// Panics if `index` was never assigned.
    pub fn title_of(&self, index: usize) -> &str {
        &self.articles[index].title
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

}


#[cfg(test)]
mod tests {

    use super::ArticleRegistry;

    #[test]
    fn dense_indices_in_encounter_order() {
        let mut registry = ArticleRegistry::new();
        assert_eq!(registry.register("Anarchism".to_string(), 12), 0);
        assert_eq!(registry.register("Autism".to_string(), 25), 1);
        assert_eq!(registry.register("Albedo".to_string(), 39), 2);

        assert_eq!(registry.size(), 3);
        assert_eq!(registry.title_of(1), "Autism");
        assert_eq!(registry.find_by_title("Albedo"), Some(2));
        assert_eq!(registry.find_by_external_id(12), Some(0));
        assert_eq!(registry.find_by_title("Atlas"), None);
        assert_eq!(registry.find_by_external_id(7), None);
    }

    #[test]
    fn registration_is_idempotent() {
        let mut registry = ArticleRegistry::new();
        let first = registry.register("O'Brien".to_string(), 100);
        let size = registry.size();
        let second = registry.register("O'Brien".to_string(), 100);
        assert_eq!(first, second);
        assert_eq!(registry.size(), size);
    }

    #[test]
    fn first_seen_wins() {
        let mut registry = ArticleRegistry::new();
        registry.register("Paris".to_string(), 1);

        // same id, other title
        assert_eq!(registry.register("Lutetia".to_string(), 1), 0);
        // same title, other id
        assert_eq!(registry.register("Paris".to_string(), 2), 0);

        assert_eq!(registry.size(), 1);
        assert_eq!(registry.find_by_title("Lutetia"), None);
        assert_eq!(registry.find_by_external_id(2), None);
        assert_eq!(registry.get(0).map(|a| a.external_id), Some(1));
    }
}
