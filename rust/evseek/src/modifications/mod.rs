mod site_enumerator;

pub use site_enumerator::{
    MultiSiteWalk,
    SingleSiteWalk,
    SiteEnumerator,
};
