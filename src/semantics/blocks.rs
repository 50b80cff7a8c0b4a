//! Block kinds and their property schemas.
//!
//! Every configuration block is the same generic property bag; what differs
//! is the schema attached to its [`BlockKind`]: the child blocks it may
//! contain, the model properties it exposes, and one semantics table per
//! dialect.

use std::sync::LazyLock;

use super::description::{Arity::*, EffectKind::*, ModelPropertyDescription, PropertyShape};
use super::registry::{Dialect, ExternalToModelMap};

/// Model properties, named as the model knows them.
pub mod properties {
    use super::{ModelPropertyDescription, PropertyShape};

    // android
    pub const COMPILE_SDK_VERSION: ModelPropertyDescription = ModelPropertyDescription::scalar("mCompileSdkVersion");
    pub const BUILD_TOOLS_VERSION: ModelPropertyDescription = ModelPropertyDescription::scalar("mBuildToolsVersion");
    pub const NAMESPACE: ModelPropertyDescription = ModelPropertyDescription::scalar("mNamespace");
    pub const DYNAMIC_FEATURES: ModelPropertyDescription =
        ModelPropertyDescription::new("mDynamicFeatures", PropertyShape::MutableSet);

    // android.defaultConfig
    pub const APPLICATION_ID: ModelPropertyDescription = ModelPropertyDescription::scalar("mApplicationId");
    pub const MIN_SDK_VERSION: ModelPropertyDescription = ModelPropertyDescription::scalar("mMinSdkVersion");
    pub const TARGET_SDK_VERSION: ModelPropertyDescription = ModelPropertyDescription::scalar("mTargetSdkVersion");
    pub const VERSION_CODE: ModelPropertyDescription = ModelPropertyDescription::scalar("mVersionCode");
    pub const VERSION_NAME: ModelPropertyDescription = ModelPropertyDescription::scalar("mVersionName");
    pub const RES_CONFIGS: ModelPropertyDescription =
        ModelPropertyDescription::new("mResourceConfigurations", PropertyShape::MutableSet);
    pub const PROGUARD_FILES: ModelPropertyDescription =
        ModelPropertyDescription::new("mProguardFiles", PropertyShape::MutableList);
    pub const TEST_INSTRUMENTATION_RUNNER_ARGUMENTS: ModelPropertyDescription =
        ModelPropertyDescription::new("mTestInstrumentationRunnerArguments", PropertyShape::MutableMap);

    // android.splits.abi
    pub const ENABLE: ModelPropertyDescription = ModelPropertyDescription::scalar("mEnable");
    pub const INCLUDE: ModelPropertyDescription = ModelPropertyDescription::new("mInclude", PropertyShape::MutableSet);
    pub const EXCLUDE: ModelPropertyDescription = ModelPropertyDescription::new("mExclude", PropertyShape::MutableSet);
    pub const UNIVERSAL_APK: ModelPropertyDescription = ModelPropertyDescription::scalar("mUniversalApk");

    // android.adbOptions
    pub const INSTALL_OPTIONS: ModelPropertyDescription =
        ModelPropertyDescription::new("mInstallOptions", PropertyShape::MutableList);
    pub const TIME_OUT_IN_MS: ModelPropertyDescription = ModelPropertyDescription::scalar("mTimeOutInMs");

    // android.kotlinOptions
    pub const JVM_TARGET: ModelPropertyDescription = ModelPropertyDescription::scalar("mJvmTarget");
    pub const USE_IR: ModelPropertyDescription = ModelPropertyDescription::scalar("mUseIR");
    pub const FREE_COMPILER_ARGS: ModelPropertyDescription =
        ModelPropertyDescription::new("mFreeCompilerArgs", PropertyShape::MutableList);
}

use properties::*;

/// The kinds of configuration block the model understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// The build file itself.
    Root,
    Android,
    DefaultConfig,
    Splits,
    Abi,
    AdbOptions,
    KotlinOptions,
    /// Extra properties (`ext` / `extra`).
    Ext,
    /// Plugin declarations (`plugins { id 'x' }`).
    Plugins,
    /// A block with no schema; its contents are kept but not modelled.
    Generic,
}

impl BlockKind {
    /// Surface name of the block; empty for `Root` and `Generic`.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Root | BlockKind::Generic => "",
            BlockKind::Android => "android",
            BlockKind::DefaultConfig => "defaultConfig",
            BlockKind::Splits => "splits",
            BlockKind::Abi => "abi",
            BlockKind::AdbOptions => "adbOptions",
            BlockKind::KotlinOptions => "kotlinOptions",
            BlockKind::Ext => "ext",
            BlockKind::Plugins => "plugins",
        }
    }

    /// Blocks that may appear directly inside this one.
    pub fn child_blocks(self) -> &'static [BlockKind] {
        match self {
            BlockKind::Root => &[BlockKind::Plugins, BlockKind::Android, BlockKind::Ext],
            BlockKind::Android => &[
                BlockKind::DefaultConfig,
                BlockKind::Splits,
                BlockKind::AdbOptions,
                BlockKind::KotlinOptions,
            ],
            BlockKind::Splits => &[BlockKind::Abi],
            _ => &[],
        }
    }

    /// Resolves a child block by its (internal) surface name.
    pub fn child_block(self, name: &str) -> Option<BlockKind> {
        self.child_blocks().iter().copied().find(|kind| kind.name() == name)
    }

    /// The model properties this block exposes.
    pub fn properties(self) -> &'static [ModelPropertyDescription] {
        match self {
            BlockKind::Android => &[COMPILE_SDK_VERSION, BUILD_TOOLS_VERSION, NAMESPACE, DYNAMIC_FEATURES],
            BlockKind::DefaultConfig => &[
                APPLICATION_ID,
                MIN_SDK_VERSION,
                TARGET_SDK_VERSION,
                VERSION_CODE,
                VERSION_NAME,
                RES_CONFIGS,
                PROGUARD_FILES,
                TEST_INSTRUMENTATION_RUNNER_ARGUMENTS,
            ],
            BlockKind::Abi => &[ENABLE, INCLUDE, EXCLUDE, UNIVERSAL_APK],
            BlockKind::AdbOptions => &[INSTALL_OPTIONS, TIME_OUT_IN_MS],
            BlockKind::KotlinOptions => &[JVM_TARGET, USE_IR, FREE_COMPILER_ARGS],
            BlockKind::Root | BlockKind::Splits | BlockKind::Ext | BlockKind::Plugins | BlockKind::Generic => &[],
        }
    }

    /// Whether already-declared properties count as contained elements even
    /// when the caller only asked for blocks.
    pub fn always_contains_properties(self) -> bool {
        self == BlockKind::Ext
    }

    /// The semantics table for this block in `dialect`.
    pub fn external_to_model_map(self, dialect: Dialect) -> &'static ExternalToModelMap {
        match (self, dialect) {
            (BlockKind::Android, Dialect::Groovy) => &ANDROID_GROOVY,
            (BlockKind::Android, Dialect::Kotlin) => &ANDROID_KOTLIN,
            (BlockKind::DefaultConfig, Dialect::Groovy) => &DEFAULT_CONFIG_GROOVY,
            (BlockKind::DefaultConfig, Dialect::Kotlin) => &DEFAULT_CONFIG_KOTLIN,
            (BlockKind::Abi, Dialect::Groovy) => &ABI_GROOVY,
            (BlockKind::Abi, Dialect::Kotlin) => &ABI_KOTLIN,
            (BlockKind::AdbOptions, Dialect::Groovy) => &ADB_OPTIONS_GROOVY,
            (BlockKind::AdbOptions, Dialect::Kotlin) => &ADB_OPTIONS_KOTLIN,
            (BlockKind::KotlinOptions, Dialect::Groovy) => &KOTLIN_OPTIONS_GROOVY,
            (BlockKind::KotlinOptions, Dialect::Kotlin) => &KOTLIN_OPTIONS_KOTLIN,
            (BlockKind::Root | BlockKind::Splits | BlockKind::Ext | BlockKind::Plugins | BlockKind::Generic, _) => &EMPTY,
        }
    }
}

/// Looks up the model property a surface name refers to inside `block`.
pub fn model_description_for(
    block: BlockKind,
    dialect: Dialect,
    name: &str,
) -> Option<ModelPropertyDescription> {
    block.external_to_model_map(dialect).description_for(name)
}

static EMPTY: LazyLock<ExternalToModelMap> = LazyLock::new(ExternalToModelMap::default);

static ANDROID_GROOVY: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("compileSdkVersion", Property, COMPILE_SDK_VERSION, Var),
        ("compileSdkVersion", Exactly(1), COMPILE_SDK_VERSION, Set),
        ("compileSdk", Property, COMPILE_SDK_VERSION, Var),
        ("buildToolsVersion", Property, BUILD_TOOLS_VERSION, Var),
        ("buildToolsVersion", Exactly(1), BUILD_TOOLS_VERSION, Set),
        ("namespace", Property, NAMESPACE, Var),
        ("namespace", Exactly(1), NAMESPACE, Set),
        ("dynamicFeatures", Property, DYNAMIC_FEATURES, Var),
    ])
});

static ANDROID_KOTLIN: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("compileSdk", Property, COMPILE_SDK_VERSION, Var),
        ("compileSdkVersion", Exactly(1), COMPILE_SDK_VERSION, Set),
        ("buildToolsVersion", Property, BUILD_TOOLS_VERSION, Var),
        ("buildToolsVersion", Exactly(1), BUILD_TOOLS_VERSION, Set),
        ("namespace", Property, NAMESPACE, Var),
        ("dynamicFeatures", Property, DYNAMIC_FEATURES, Val),
    ])
});

static DEFAULT_CONFIG_GROOVY: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("applicationId", Property, APPLICATION_ID, Var),
        ("applicationId", Exactly(1), APPLICATION_ID, Set),
        ("minSdkVersion", Property, MIN_SDK_VERSION, Var),
        ("minSdkVersion", Exactly(1), MIN_SDK_VERSION, Set),
        ("minSdk", Property, MIN_SDK_VERSION, Var),
        ("targetSdkVersion", Property, TARGET_SDK_VERSION, Var),
        ("targetSdkVersion", Exactly(1), TARGET_SDK_VERSION, Set),
        ("targetSdk", Property, TARGET_SDK_VERSION, Var),
        ("versionCode", Property, VERSION_CODE, Var),
        ("versionCode", Exactly(1), VERSION_CODE, Set),
        ("versionName", Property, VERSION_NAME, Var),
        ("versionName", Exactly(1), VERSION_NAME, Set),
        ("resConfigs", AtLeast(0), RES_CONFIGS, AugmentList),
        ("resConfig", Exactly(1), RES_CONFIGS, AugmentList),
        ("proguardFiles", AtLeast(0), PROGUARD_FILES, AugmentList),
        ("proguardFile", Exactly(1), PROGUARD_FILES, AugmentList),
        ("setProguardFiles", Exactly(1), PROGUARD_FILES, ClearAndAugmentList),
        ("testInstrumentationRunnerArguments", Property, TEST_INSTRUMENTATION_RUNNER_ARGUMENTS, Var),
        ("testInstrumentationRunnerArguments", Exactly(1), TEST_INSTRUMENTATION_RUNNER_ARGUMENTS, AugmentMap),
        ("testInstrumentationRunnerArgument", Exactly(2), TEST_INSTRUMENTATION_RUNNER_ARGUMENTS, AugmentMap),
    ])
});

static DEFAULT_CONFIG_KOTLIN: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("applicationId", Property, APPLICATION_ID, Var),
        ("minSdk", Property, MIN_SDK_VERSION, Var),
        ("minSdkVersion", Exactly(1), MIN_SDK_VERSION, Set),
        ("targetSdk", Property, TARGET_SDK_VERSION, Var),
        ("targetSdkVersion", Exactly(1), TARGET_SDK_VERSION, Set),
        ("versionCode", Property, VERSION_CODE, Var),
        ("versionName", Property, VERSION_NAME, Var),
        ("resourceConfigurations", Property, RES_CONFIGS, Val),
        ("resConfigs", AtLeast(0), RES_CONFIGS, AugmentList),
        ("resConfig", Exactly(1), RES_CONFIGS, AugmentList),
        ("proguardFiles", AtLeast(0), PROGUARD_FILES, AugmentList),
        ("proguardFile", Exactly(1), PROGUARD_FILES, AugmentList),
        ("setProguardFiles", Exactly(1), PROGUARD_FILES, ClearAndAugmentList),
        ("testInstrumentationRunnerArguments", Property, TEST_INSTRUMENTATION_RUNNER_ARGUMENTS, Val),
        ("testInstrumentationRunnerArguments", Exactly(1), TEST_INSTRUMENTATION_RUNNER_ARGUMENTS, AugmentMap),
        ("testInstrumentationRunnerArgument", Exactly(2), TEST_INSTRUMENTATION_RUNNER_ARGUMENTS, AugmentMap),
    ])
});

static ABI_GROOVY: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("enable", Property, ENABLE, Var),
        ("enable", Exactly(1), ENABLE, Set),
        ("enable", Exactly(0), ENABLE, Get),
        ("include", AtLeast(0), INCLUDE, AddAsList),
        ("setIncludes", Exactly(1), INCLUDE, ClearAndAugmentList),
        ("reset", Exactly(0), INCLUDE, Reset),
        ("exclude", AtLeast(0), EXCLUDE, AddAsList),
        ("setExcludes", Exactly(1), EXCLUDE, ClearAndAugmentList),
        ("universalApk", Property, UNIVERSAL_APK, Var),
        ("universalApk", Exactly(1), UNIVERSAL_APK, Set),
    ])
});

static ABI_KOTLIN: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("isEnable", Property, ENABLE, Var),
        ("include", AtLeast(0), INCLUDE, AddAsList),
        ("reset", Exactly(0), INCLUDE, Reset),
        ("exclude", AtLeast(0), EXCLUDE, AddAsList),
        ("isUniversalApk", Property, UNIVERSAL_APK, Var),
    ])
});

static ADB_OPTIONS_GROOVY: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("installOptions", Property, INSTALL_OPTIONS, Var),
        ("installOptions", AtLeast(0), INSTALL_OPTIONS, AugmentList),
        ("setInstallOptions", AtLeast(0), INSTALL_OPTIONS, ClearAndAugmentList),
        ("timeOutInMs", Property, TIME_OUT_IN_MS, Var),
        ("timeOutInMs", Exactly(1), TIME_OUT_IN_MS, Set),
    ])
});

static ADB_OPTIONS_KOTLIN: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("installOptions", Property, INSTALL_OPTIONS, Var),
        ("installOptions", AtLeast(0), INSTALL_OPTIONS, AugmentList),
        ("setInstallOptions", AtLeast(0), INSTALL_OPTIONS, ClearAndAugmentList),
        ("timeOutInMs", Property, TIME_OUT_IN_MS, Var),
        ("setTimeOutInMs", Exactly(1), TIME_OUT_IN_MS, Set),
    ])
});

static KOTLIN_OPTIONS_GROOVY: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("jvmTarget", Property, JVM_TARGET, Var),
        ("jvmTarget", Exactly(1), JVM_TARGET, Set),
        ("useIR", Property, USE_IR, Var),
        ("useIR", Exactly(1), USE_IR, Set),
        ("freeCompilerArgs", Property, FREE_COMPILER_ARGS, Var),
    ])
});

static KOTLIN_OPTIONS_KOTLIN: LazyLock<ExternalToModelMap> = LazyLock::new(|| {
    ExternalToModelMap::from_rows(&[
        ("jvmTarget", Property, JVM_TARGET, Var),
        ("useIR", Property, USE_IR, Var),
        ("freeCompilerArgs", Property, FREE_COMPILER_ARGS, Var),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::{Arity, EffectKind};

    const ALL_KINDS: [BlockKind; 10] = [
        BlockKind::Root,
        BlockKind::Android,
        BlockKind::DefaultConfig,
        BlockKind::Splits,
        BlockKind::Abi,
        BlockKind::AdbOptions,
        BlockKind::KotlinOptions,
        BlockKind::Ext,
        BlockKind::Plugins,
        BlockKind::Generic,
    ];

    #[test]
    fn test_adb_options_scenarios() {
        let groovy = BlockKind::AdbOptions.external_to_model_map(Dialect::Groovy);

        let install = groovy.lookup("installOptions", Arity::Property).unwrap();
        assert_eq!(install.property, INSTALL_OPTIONS);
        assert_eq!(install.effect, EffectKind::Var);

        let timeout = groovy.lookup("timeOutInMs", Arity::Exactly(1)).unwrap();
        assert_eq!(timeout.property, TIME_OUT_IN_MS);
        assert_eq!(timeout.effect, EffectKind::Set);
    }

    #[test]
    fn test_dialects_share_property_ids() {
        let groovy = BlockKind::DefaultConfig.external_to_model_map(Dialect::Groovy);
        let kotlin = BlockKind::DefaultConfig.external_to_model_map(Dialect::Kotlin);

        let from_groovy = groovy.lookup("minSdkVersion", Arity::Exactly(1)).unwrap();
        let from_kotlin = kotlin.lookup("minSdk", Arity::Property).unwrap();
        assert_eq!(from_groovy.property, from_kotlin.property);
        assert_eq!(kotlin.lookup("minSdkVersion", Arity::Property), None);
    }

    #[test]
    fn test_every_table_property_is_in_schema() {
        for kind in ALL_KINDS {
            for dialect in [Dialect::Groovy, Dialect::Kotlin] {
                for (key, description) in kind.external_to_model_map(dialect).iter() {
                    assert!(
                        kind.properties().contains(&description.property),
                        "{kind:?}/{dialect:?}: {} maps outside the schema",
                        key.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_child_blocks() {
        assert_eq!(BlockKind::Root.child_block("android"), Some(BlockKind::Android));
        assert_eq!(BlockKind::Root.child_block("ext"), Some(BlockKind::Ext));
        assert_eq!(BlockKind::Root.child_block("plugins"), Some(BlockKind::Plugins));
        assert_eq!(BlockKind::Splits.child_block("abi"), Some(BlockKind::Abi));
        assert_eq!(BlockKind::Android.child_block("abi"), None);
        assert!(BlockKind::Ext.always_contains_properties());
        assert!(!BlockKind::Android.always_contains_properties());
    }

    #[test]
    fn test_model_description_for() {
        assert_eq!(
            model_description_for(BlockKind::AdbOptions, Dialect::Kotlin, "setTimeOutInMs"),
            Some(TIME_OUT_IN_MS)
        );
        assert_eq!(model_description_for(BlockKind::Ext, Dialect::Groovy, "foo"), None);
    }
}
