mod locator;

pub use locator::FileLocator;
