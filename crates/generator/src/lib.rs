// Site content and metadata generation: sitemap, article outline, reading state

pub mod article;
pub mod posts;
pub mod reading;
pub mod sitemap;
pub mod toc;

pub use article::{ArticleView, render_article};
pub use posts::{
    DirectoryPostSource, PostSource, PostSourceError, PublishedPost, RestPostSource,
    split_front_matter,
};
pub use sitemap::{build_sitemap, generate_sitemap, minimal_sitemap, robots_txt, xml_escape};
pub use toc::{extract_toc, slugify};
