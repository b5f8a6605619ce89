use tracing::warn;

use crate::domain::models::{Product, ProductId};

const CATALOG_CSV: &str = include_str!("../../data/catalog.csv");

/// Number of products shown on the home screen.
pub const FEATURED_COUNT: usize = 3;

/// Where image references resolve from. Catalog rows store site-root-relative
/// paths; screens that render below the root need a `../` hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBase {
    SiteRoot,
    Subpage,
}

impl ImageBase {
    pub fn prefix(self) -> &'static str {
        match self {
            ImageBase::SiteRoot => "images/",
            ImageBase::Subpage => "../images/",
        }
    }

    /// Rebases a stored image reference onto this base, keeping only the
    /// final path component of the stored value.
    pub fn rebase(self, image: &str) -> String {
        let file = image.rsplit('/').next().unwrap_or(image);
        format!("{}{}", self.prefix(), file)
    }
}

/// The product catalog, loaded once at startup from an embedded CSV table.
///
/// Rows that fail to parse are logged and skipped rather than failing the
/// whole load, so a bad edit to the table degrades to a shorter catalog
/// instead of an unusable one.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn load() -> Self {
        Self::from_csv(CATALOG_CSV)
    }

    pub fn from_csv(data: &str) -> Self {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let mut products = Vec::new();
        for row in reader.deserialize::<Product>() {
            match row {
                Ok(product) => products.push(product),
                Err(err) => warn!("skipping malformed catalog row: {err}"),
            }
        }
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Returns the first [`FEATURED_COUNT`] products with their image
    /// references rebased for the given screen. Fewer rows than that yields
    /// a shorter list.
    pub fn featured(&self, base: ImageBase) -> Vec<Product> {
        self.products
            .iter()
            .take(FEATURED_COUNT)
            .map(|p| {
                let mut p = p.clone();
                p.image = base.rebase(&p.image);
                p
            })
            .collect()
    }

    /// Case-insensitive substring match over name, category and description.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_CSV: &str = "\
id,name,price,image,category,description,badge
1,310 Diamonds,1.49,images/battle-pass.jpg,Diamonds,Perfect starter pack,Popular
2,231 Diamonds,2.99,images/akm-skin.jpg,Diamonds,Great value bundle,Limited
3,583 Diamonds,6.99,images/elite-outfit.jpg,Diamonds,Most popular choice,New
4,$10 Gift Card,10.00,images/helmet.jpg,Gift Cards,Instant digital delivery,New
";

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = Catalog::load();
        assert_eq!(catalog.len(), 17);

        let mut ids: Vec<u32> = catalog.products().iter().map(|p| p.id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 17);
    }

    #[test]
    fn test_find_by_id() {
        let catalog = Catalog::from_csv(SMALL_CSV);
        assert_eq!(
            catalog.find(ProductId(2)).map(|p| p.name.as_str()),
            Some("231 Diamonds")
        );
        assert!(catalog.find(ProductId(99)).is_none());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let csv = "\
id,name,price,image,category,description,badge
1,310 Diamonds,1.49,images/battle-pass.jpg,Diamonds,Perfect starter pack,Popular
oops,Broken Row,not-a-price,x,y,z,w
3,583 Diamonds,6.99,images/elite-outfit.jpg,Diamonds,Most popular choice,New
";
        let catalog = Catalog::from_csv(csv);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.find(ProductId(3)).is_some());
    }

    #[test]
    fn test_featured_takes_first_three() {
        let catalog = Catalog::from_csv(SMALL_CSV);
        let featured = catalog.featured(ImageBase::SiteRoot);

        assert_eq!(featured.len(), 3);
        assert_eq!(featured[0].id, ProductId(1));
        assert_eq!(featured[2].id, ProductId(3));
    }

    #[test]
    fn test_featured_shorter_catalog() {
        let csv = "\
id,name,price,image,category,description,badge
1,310 Diamonds,1.49,images/battle-pass.jpg,Diamonds,Perfect starter pack,Popular
";
        let catalog = Catalog::from_csv(csv);
        assert_eq!(catalog.featured(ImageBase::SiteRoot).len(), 1);
    }

    #[test]
    fn test_featured_rebases_images_per_base() {
        let catalog = Catalog::from_csv(SMALL_CSV);

        let root = catalog.featured(ImageBase::SiteRoot);
        assert_eq!(root[0].image, "images/battle-pass.jpg");

        let sub = catalog.featured(ImageBase::Subpage);
        assert_eq!(sub[0].image, "../images/battle-pass.jpg");
    }

    #[test]
    fn test_rebase_keeps_only_final_component() {
        assert_eq!(
            ImageBase::SiteRoot.rebase("assets/img/helmet.jpg"),
            "images/helmet.jpg"
        );
        assert_eq!(ImageBase::Subpage.rebase("helmet.jpg"), "../images/helmet.jpg");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = Catalog::from_csv(SMALL_CSV);
        let hits = catalog.search("DIAMONDS");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_search_matches_category_and_description() {
        let catalog = Catalog::from_csv(SMALL_CSV);

        let by_category = catalog.search("gift cards");
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].id, ProductId(4));

        let by_description = catalog.search("starter");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, ProductId(1));
    }

    #[test]
    fn test_search_empty_query_matches_all() {
        let catalog = Catalog::from_csv(SMALL_CSV);
        assert_eq!(catalog.search("").len(), catalog.len());
    }

    #[test]
    fn test_search_no_match() {
        let catalog = Catalog::from_csv(SMALL_CSV);
        assert!(catalog.search("plutonium").is_empty());
    }
}
