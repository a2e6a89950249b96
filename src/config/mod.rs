//! Configuration module

mod site;

pub use site::CategoryConfig;
pub use site::CtaButton;
pub use site::DeployMode;
pub use site::FooterConfig;
pub use site::HeroConfig;
pub use site::LogoConfig;
pub use site::NavItem;
pub use site::SiteConfig;
pub use site::SiteInfo;
