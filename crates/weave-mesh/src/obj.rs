//! Wavefront OBJ reading and writing.
//!
//! Only the subset a cloth needs: `v`, `vt`, `vn` and triangular `f`
//! records whose vertex references all carry a texture index. Every
//! other record (`o`, `g`, `s`, `usemtl`, comments, ...) is skipped.
//!
//! Parsing fails as a whole: a malformed record produces an error and no
//! mesh, never a mesh with the offending face silently dropped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use weave_math::{Vec2, Vec3};
use weave_types::{WeaveError, WeaveResult};

use crate::mesh::{ClothMesh, Face};
use crate::normals::vertex_normals;

/// Parse an OBJ document. The result is validated before it is returned.
pub fn read_obj<R: BufRead>(reader: R) -> WeaveResult<ClothMesh> {
    let mut mesh = ClothMesh::default();
    let mut normals: Vec<Vec3> = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };
        let rest: Vec<&str> = tokens.collect();

        match tag {
            "v" => mesh.positions.push(parse_vec3(&rest, line_no)?),
            "vn" => normals.push(parse_vec3(&rest, line_no)?),
            "vt" => {
                let values = parse_floats(&rest, 2, line_no)?;
                mesh.uvs.push(Vec2::new(values[0], values[1]));
            }
            "f" => {
                if rest.len() != 3 {
                    return Err(parse_error(
                        line_no,
                        format!("face has {} vertices, only triangles are supported", rest.len()),
                    ));
                }
                let mut face = Face {
                    vertices: [0; 3],
                    uvs: [0; 3],
                };
                for (k, token) in rest.iter().enumerate() {
                    let (v, vt) = parse_face_ref(
                        token,
                        mesh.positions.len(),
                        mesh.uvs.len(),
                        line_no,
                    )?;
                    face.vertices[k] = v;
                    face.uvs[k] = vt;
                }
                mesh.faces.push(face);
            }
            _ => {}
        }
    }

    if normals.len() == mesh.positions.len() {
        mesh.normals = normals;
    } else if !normals.is_empty() {
        tracing::debug!(
            normals = normals.len(),
            positions = mesh.positions.len(),
            "OBJ normals are not per-position, regenerating"
        );
    }

    mesh.validate()?;
    Ok(mesh)
}

/// Load and parse an OBJ file.
pub fn load_obj<P: AsRef<Path>>(path: P) -> WeaveResult<ClothMesh> {
    let file = File::open(path)?;
    read_obj(BufReader::new(file))
}

/// Write a mesh as OBJ: positions, UVs, per-position normals and
/// `f v/vt/vn` faces (1-based).
///
/// Normals are regenerated from the positions when the mesh has none.
pub fn write_obj<W: Write>(mesh: &ClothMesh, mut out: W) -> WeaveResult<()> {
    let normals = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals.clone()
    } else {
        vertex_normals(&mesh.positions, &mesh.faces)
    };

    writeln!(out, "# weave cloth mesh")?;
    writeln!(
        out,
        "# {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(out, "vt {} {}", uv.x, uv.y)?;
    }
    for n in &normals {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for face in &mesh.faces {
        write!(out, "f")?;
        for k in 0..3 {
            let v = face.vertices[k] + 1;
            let vt = face.uvs[k] + 1;
            write!(out, " {v}/{vt}/{v}")?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Write a mesh to an OBJ file at `path`.
pub fn save_obj<P: AsRef<Path>>(mesh: &ClothMesh, path: P) -> WeaveResult<()> {
    let file = File::create(path)?;
    write_obj(mesh, BufWriter::new(file))
}

fn parse_error(line: usize, message: String) -> WeaveError {
    WeaveError::Parse { line, message }
}

fn parse_floats(tokens: &[&str], count: usize, line: usize) -> WeaveResult<Vec<f32>> {
    if tokens.len() < count {
        return Err(parse_error(
            line,
            format!("expected {count} numbers, found {}", tokens.len()),
        ));
    }
    tokens[..count]
        .iter()
        .map(|t| {
            t.parse::<f32>()
                .map_err(|e| parse_error(line, format!("bad number '{t}': {e}")))
        })
        .collect()
}

fn parse_vec3(tokens: &[&str], line: usize) -> WeaveResult<Vec3> {
    let v = parse_floats(tokens, 3, line)?;
    Ok(Vec3::new(v[0], v[1], v[2]))
}

/// Resolve one `v/vt[/vn]` face reference to 0-based (vertex, uv) indices.
fn parse_face_ref(
    token: &str,
    vertex_count: usize,
    uv_count: usize,
    line: usize,
) -> WeaveResult<(u32, u32)> {
    let mut parts = token.split('/');
    let v = parts.next().unwrap_or("");
    let vt = parts.next().unwrap_or("");
    if vt.is_empty() {
        return Err(parse_error(
            line,
            format!("face reference '{token}' has no texture index"),
        ));
    }
    let v = resolve_index(v, vertex_count, line)?;
    let vt = resolve_index(vt, uv_count, line)?;
    Ok((v, vt))
}

/// OBJ indices are 1-based; negative values count back from the end.
fn resolve_index(token: &str, count: usize, line: usize) -> WeaveResult<u32> {
    let raw: i64 = token
        .parse()
        .map_err(|e| parse_error(line, format!("bad index '{token}': {e}")))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(count as i64 + r),
    };
    match resolved {
        Some(i) if i >= 0 && (i as usize) < count => Ok(i as u32),
        _ => Err(parse_error(
            line,
            format!("index {raw} is out of range (have {count})"),
        )),
    }
}
