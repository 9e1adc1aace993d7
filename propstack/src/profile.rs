//! Profile overlays loaded after the base sources.
//!
//! The active profile list is read from the reserved profiles key and split
//! like a path list. Each profile contributes
//! `<base>-<profile>.properties`, `<base>-<profile>.yaml` and
//! `<base>-<profile>.yml` bundled resources, all optional, loaded in list
//! order so later profiles win.

use tracing::debug;

use crate::PropsResult;
use crate::loader::Loader;
use crate::map::Origin;
use crate::paths::split_paths;

impl Loader {
    /// Profiles named by the profiles key, in declaration order.
    ///
    /// The key is resolved against the entries loaded so far and then the
    /// fallback source, so an environment variable can activate profiles
    /// that the bundled resources do not mention. Duplicates are kept.
    #[must_use]
    pub fn active_profiles(&self) -> Vec<String> {
        self.lookup(&self.options().profiles_key)
            .map(|listed| split_paths(&listed).into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Loads the bundled overlays for every active profile.
    ///
    /// Returns the number of overlay sources found. Missing overlays are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns the first overlay that exists but fails to read or parse.
    pub fn load_via_profiles(&mut self) -> PropsResult<usize> {
        let profiles = self.active_profiles();
        if profiles.is_empty() {
            return Ok(0);
        }
        debug!(?profiles, "loading profile overlays");
        let base = self.options().base_name.clone();
        let mut found = 0;
        for profile in &profiles {
            found += self.load_named(&format!("{base}-{profile}"), Origin::BundledResource)?;
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Loader, NoFallback, Origin, SystemProperties};
    use anyhow::{Result, ensure};
    use rstest::rstest;
    use test_helpers::{with_jail, write_file};

    #[rstest]
    fn no_profiles_key_loads_nothing() -> Result<()> {
        with_jail(|j| {
            write_file(j, "resources/application-dev.properties", "a=1")?;
            let mut loader = Loader::builder().fallback(NoFallback).build();
            let found = loader.load_via_profiles().map_err(test_helpers::figment_error)?;
            assert_eq!(found, 0);
            assert_eq!(loader.size(), 0);
            Ok(())
        })
    }

    #[rstest]
    fn later_profiles_override_earlier_ones() -> Result<()> {
        let loader = with_jail(|j| {
            write_file(
                j,
                "resources/application.properties",
                "config.profiles.active=dev;dev2\nk=base\nbase.only=yes",
            )?;
            write_file(j, "resources/application-dev.properties", "k=dev\ndev.only=yes")?;
            write_file(j, "resources/application-dev2.yaml", "k: dev2\n")?;
            let mut loader = Loader::new();
            loader
                .load_properties("application.properties", Origin::BundledResource)
                .map_err(test_helpers::figment_error)?;
            let found = loader.load_via_profiles().map_err(test_helpers::figment_error)?;
            assert_eq!(found, 2);
            Ok(loader)
        })?;
        let props = loader.eval();
        ensure!(props.get("k") == Some("dev2"), "got {:?}", props.get("k"));
        ensure!(props.get("dev.only") == Some("yes"), "dev overlay missing");
        ensure!(props.get("base.only") == Some("yes"), "base entry lost");
        Ok(())
    }

    #[rstest]
    fn profiles_key_may_come_from_fallback() -> Result<()> {
        with_jail(|j| {
            write_file(j, "resources/application-ci.yml", "mode: ci\n")?;
            let mut loader = Loader::builder()
                .fallback(SystemProperties::new().with("config.profiles.active", "ci"))
                .build();
            loader.load_via_profiles().map_err(test_helpers::figment_error)?;
            assert_eq!(loader.map().get("mode"), Some("ci"));
            Ok(())
        })
    }

    #[rstest]
    fn profile_list_keeps_duplicates() {
        let loader = Loader::builder()
            .fallback(SystemProperties::new().with("config.profiles.active", "dev, dev2 ,dev"))
            .build();
        assert_eq!(loader.active_profiles(), ["dev", "dev2", "dev"]);
    }
}
