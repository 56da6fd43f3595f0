#![allow(dead_code)]

use buildwatch::config::{CommandConfig, ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.config.watch.root = root.into();
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.config.watch.extensions.push(ext.to_string());
        self
    }

    pub fn only_extension(mut self, ext: &str) -> Self {
        self.config.watch.extensions = vec![ext.to_string()];
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    pub fn build_cmd(mut self, cmd: CommandConfig) -> Self {
        self.config.build = cmd;
        self
    }

    pub fn test_cmd(mut self, cmd: CommandConfig) -> Self {
        self.config.test = cmd;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CommandConfig`.
pub struct CommandConfigBuilder {
    cmd: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            cmd: CommandConfig::new([program]),
        }
    }

    /// `sh -c <script>`.
    pub fn shell(script: &str) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.cmd.cmd.push(arg.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.cmd.name = Some(name.to_string());
        self
    }

    pub fn ignore_exit_code(mut self, code: i32) -> Self {
        self.cmd.ignore_exit_codes.push(code);
        self
    }

    pub fn build(self) -> CommandConfig {
        self.cmd
    }
}
