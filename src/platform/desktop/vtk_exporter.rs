use std::{
    fs::{create_dir_all, File},
    io::Write,
    path::PathBuf,
};

use vtkio::model::*;

use crate::{error::Result, floating_type_mod::FT, LavaError, LavaLampSimulation};

/// Writes one legacy VTK file per snapshot plus a `.vtk.series` index that
/// ParaView understands.
pub(crate) struct VtkExporter {
    /// something like './data' + 'lava' which will get expanded to './data/lava-00001.vtk' and './data/lava.vtk.series'
    folder: PathBuf,
    basename: String,
    snapshot_number: usize,
    series_file: File,
}

impl VtkExporter {
    pub(crate) fn new(folder: impl Into<PathBuf>, basename: impl Into<String>) -> Result<VtkExporter> {
        let folder: PathBuf = folder.into();
        let basename: String = basename.into();

        create_dir_all(&folder)?;

        let mut series_file = File::create(folder.join(format!("{}.vtk.series", basename)))?;
        let series_prelude_str = "{\n\"file-series-version\": \"1.0\",\n\"files\": [";
        series_file.write_all(series_prelude_str.as_bytes())?;

        log::info!("writing VTK snapshots to {}", folder.display());

        Ok(VtkExporter {
            series_file,
            folder,
            basename,
            snapshot_number: 1,
        })
    }

    pub(crate) fn add_snapshot(&mut self, simulation: &LavaLampSimulation) -> Result<()> {
        if self.snapshot_number > 1 {
            self.series_file.write_all(",".as_bytes())?;
        }

        let vtk_filename = format!("{}-{:05}.vtk", self.basename, self.snapshot_number);
        write_vtk_file(self.folder.join(&vtk_filename), simulation)?;

        write!(
            self.series_file,
            "\n{{ \"name\": \"{}\", \"time\": {} }}",
            vtk_filename,
            simulation.tick_count()
        )?;

        self.snapshot_number += 1;
        Ok(())
    }
}

impl Drop for VtkExporter {
    fn drop(&mut self) {
        let series_end_str = "\n]\n}";
        if let Err(err) = self.series_file.write_all(series_end_str.as_bytes()) {
            log::warn!("failed to close VTK series file: {}", err);
        }
    }
}

/// One vertex per cell center, carrying the fields a renderer would show.
fn write_vtk_file(path: PathBuf, simulation: &LavaLampSimulation) -> Result<()> {
    let width = simulation.width();
    let num_cells = width * simulation.height();

    let vtk_points: Vec<FT> = (0..num_cells)
        .flat_map(|i| [(i % width) as FT + 0.5, (i / width) as FT + 0.5, 0.])
        .collect();
    let vtk_verts: Vec<u32> = (0..num_cells).flat_map(|i| [1, i as u32]).collect();

    let mut data_arrays: Vec<DataArray> = Vec::new();
    for (name, arr) in [
        ("rho_a", simulation.rho_a()),
        ("rho_b", simulation.rho_b()),
        ("temp", simulation.temp()),
    ] {
        let mut data_array = DataArray::scalars(name, 1);
        data_array.data = arr.to_vec().into();
        data_arrays.push(data_array);
    }

    let mut vtk_velocity = DataArray::scalars("velocity", 3);
    vtk_velocity.data = simulation
        .ux()
        .iter()
        .zip(simulation.uy())
        .flat_map(|(&ux, &uy)| [ux, uy, 0.])
        .collect::<Vec<FT>>()
        .into();
    data_arrays.push(vtk_velocity);

    let vtk = Vtk {
        version: Version::new((4, 2)),
        byte_order: ByteOrder::BigEndian,
        title: String::from("Lava Lamp LBM 1.0"),
        file_path: Some(path.clone()),
        data: DataSet::PolyData {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(PolyDataPiece {
                points: vtk_points.into(),
                verts: VertexNumbers::Legacy {
                    num_cells: num_cells as u32,
                    vertices: vtk_verts,
                }
                .into(),
                data: Attributes {
                    cell: Vec::new(),
                    point: data_arrays.into_iter().map(Attribute::DataArray).collect(),
                },
                ..Default::default()
            }))],
        },
    };

    vtk.export(&path)
        .map_err(|err| LavaError::Export(format!("{}: {:?}", path.display(), err)))
}
