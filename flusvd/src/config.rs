//! Pipeline parameters.

use std::path::{Path, PathBuf};

/// Pipeline parameters.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParam
{
    /// Root directory of inputs and outputs.
    pub root: PathBuf,
    /// Raw admissions table.
    pub admissions: PathBuf,
    /// Locations reference tables; the first existing one is used.
    pub locations: Vec<PathBuf>,
    /// Formatted table.
    pub formatted: PathBuf,
    /// Population-normalized table.
    pub popnorm: PathBuf,
    /// Z-score table.
    pub zscore: PathBuf,
    /// Factor table of the population-normalized matrix.
    pub svd_popnorm: PathBuf,
    /// Factor table of the z-score matrix.
    pub svd_zscore: PathBuf,
    /// Value column candidates of the population-normalized table.
    pub popnorm_value_columns: Vec<String>,
    /// Value column candidates of the z-score table.
    pub zscore_value_columns: Vec<String>,
    /// Population unit of the normalized admissions.
    pub rate_per: f64,
    /// Max number of kept components. `None` keeps all.
    pub n_components: Option<usize>,
    /// Max number of Jacobi sweeps. `None` means no upper limit.
    pub max_sweep: Option<usize>,
}

impl Default for PipelineParam
{
    fn default() -> Self
    {
        PipelineParam {
            root: PathBuf::from("."),
            admissions: PathBuf::from("data/target-hospital-admissions_raw.csv"),
            locations: vec![
                PathBuf::from("data/locations.csv"),
                PathBuf::from("data/from_state_to_fip_and_pop.csv"),
            ],
            formatted: PathBuf::from("analysis_data/formatted_flu.csv"),
            popnorm: PathBuf::from("analysis_data/hosps_pop_norm.csv"),
            zscore: PathBuf::from("analysis_data/hosps_pop_zscore.csv"),
            svd_popnorm: PathBuf::from("analysis_data/SVD_flu_pop.csv"),
            svd_zscore: PathBuf::from("analysis_data/SVD_flu_zscore.csv"),
            popnorm_value_columns: vec!["hosps_pop_norm".to_string()],
            zscore_value_columns: vec!["zflu".to_string()],
            rate_per: 100000.,
            n_components: None,
            max_sweep: Some(100),
        }
    }
}

impl PipelineParam
{
    /// `path` resolved against `root`.
    pub fn resolve(&self, path: &Path) -> PathBuf
    {
        self.root.join(path)
    }

    /// Column map table accompanying a factor table: `SVD_flu_pop.csv` → `SVD_flu_pop_columns.csv`.
    pub fn columns_path(factors: &Path) -> PathBuf
    {
        let stem = factors.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let ext = factors.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();

        factors.with_file_name(format!("{}_columns{}", stem, ext))
    }
}

//

#[test]
fn test_paths()
{
    let par = PipelineParam {
        root: PathBuf::from("/tmp/run"),
        ..Default::default()
    };

    assert_eq!(par.resolve(&par.formatted), PathBuf::from("/tmp/run/analysis_data/formatted_flu.csv"));
    assert_eq!(
        PipelineParam::columns_path(&par.resolve(&par.svd_zscore)),
        PathBuf::from("/tmp/run/analysis_data/SVD_flu_zscore_columns.csv")
    );

    let abs = PathBuf::from("/data/adm.csv");
    assert_eq!(par.resolve(&abs), abs);
}
