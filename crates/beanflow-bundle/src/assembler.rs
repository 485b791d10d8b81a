//! デプロイアーカイブの組み立て
//!
//! 作業ディレクトリに実行定義と拡張設定をコピーし、ZIPに固めて出力先へ配置する。

use crate::descriptor::ArchiveDescriptor;
use crate::error::{BundleError, BundleResult};
use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// アーカイブ直下に置く実行定義のファイル名
pub const DESCRIPTOR_FILE_NAME: &str = "Dockerrun.aws.json";

pub struct ArchiveAssembler;

impl ArchiveAssembler {
    /// アーカイブを組み立てて destination に配置
    ///
    /// destination が既に存在する場合は削除してから置き換える（マージしない）。
    /// 失敗時に書きかけのファイルが destination に残ることはない。
    pub fn assemble(
        descriptor: &ArchiveDescriptor,
        extensions_dir: Option<&Path>,
        destination: &Path,
    ) -> BundleResult<()> {
        tracing::debug!("Assembling archive: {}", destination.display());

        // ディレクトリは置き換えの対象にしない
        if destination.is_dir() {
            return Err(directory_destination(destination));
        }

        let scratch = tempfile::tempdir()?;
        Self::stage(descriptor, extensions_dir, scratch.path())?;

        // 出力先と同じディレクトリに一時ファイルを作成（rename で配置するため）
        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::Builder::new()
            .prefix(".beanflow-")
            .suffix(".zip")
            .tempfile_in(parent)?;
        let size = Self::write_zip(scratch.path(), staged.as_file_mut())?;

        Self::remove_existing(destination)?;
        staged
            .persist(destination)
            .map_err(|e| BundleError::Persist {
                path: destination.to_path_buf(),
                source: e.error,
            })?;

        tracing::info!(
            path = %destination.display(),
            bytes = size,
            "Archive assembled"
        );
        Self::check_archive_size(size);

        Ok(())
    }

    /// 作業領域でアーカイブを組み立て、その内容を返す
    ///
    /// 作業領域は戻り値を返す前に破棄される。
    pub fn assemble_to_bytes(
        descriptor: &ArchiveDescriptor,
        extensions_dir: Option<&Path>,
    ) -> BundleResult<Vec<u8>> {
        let scratch = tempfile::tempdir()?;
        let archive_path = scratch.path().join("bundle.zip");
        Self::assemble(descriptor, extensions_dir, &archive_path)?;
        Ok(fs::read(&archive_path)?)
    }

    /// 作業ディレクトリに実行定義と拡張設定を配置
    fn stage(
        descriptor: &ArchiveDescriptor,
        extensions_dir: Option<&Path>,
        scratch: &Path,
    ) -> BundleResult<()> {
        fs::write(scratch.join(DESCRIPTOR_FILE_NAME), descriptor.to_json()?)?;

        let Some(source) = extensions_dir.filter(|dir| dir.is_dir()) else {
            if let Some(dir) = extensions_dir {
                tracing::debug!("Extensions directory not found, skipping: {}", dir.display());
            }
            return Ok(());
        };

        // "." や ".." のように末尾の名前を持たないパスは受け付けない
        let Some(name) = source.file_name() else {
            return Err(BundleError::InvalidExtensionsDir {
                path: source.to_path_buf(),
            });
        };
        let target_root = scratch.join(name);
        fs::create_dir_all(&target_root)?;

        let mut copied = 0usize;
        for entry in WalkDir::new(source)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let target = target_root.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }

        tracing::debug!(
            "Copied {} extension file(s) from {}",
            copied,
            source.display()
        );
        Ok(())
    }

    /// 作業ディレクトリの内容をZIPとして書き出し、サイズを返す
    fn write_zip<W: Write + Seek>(source: &Path, writer: W) -> BundleResult<u64> {
        let mut zip = ZipWriter::new(writer);
        let file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        let dir_options = SimpleFileOptions::default().unix_permissions(0o755);

        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let name = entry_name(relative);

            if entry.file_type().is_dir() {
                zip.add_directory(name, dir_options)?;
            } else {
                zip.start_file(name, file_options)?;
                let mut file = File::open(entry.path())?;
                std::io::copy(&mut file, &mut zip)?;
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(writer.stream_position()?)
    }

    /// 既存の出力先ファイルを削除
    fn remove_existing(destination: &Path) -> BundleResult<()> {
        match fs::symlink_metadata(destination) {
            Ok(metadata) if metadata.is_dir() => return Err(directory_destination(destination)),
            Ok(_) => fs::remove_file(destination)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// アーカイブサイズのチェックと警告
    fn check_archive_size(size: u64) {
        const MAX_SOURCE_BUNDLE_SIZE: u64 = 500 * 1024 * 1024; // 500MB

        if size > MAX_SOURCE_BUNDLE_SIZE {
            tracing::warn!(
                "警告: アーカイブが大きすぎます（{}MB）\n\
                 デプロイ先のソースバンドル上限（500MB）を超えています。",
                size / 1024 / 1024
            );
        }
    }
}

fn directory_destination(destination: &Path) -> BundleError {
    BundleError::Persist {
        path: destination.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::IsADirectory,
            "出力先が既存のディレクトリです",
        ),
    }
}

/// ZIPエントリ名（区切り文字は常に `/`）
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ImageRef, PortMapping};
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn descriptor() -> ArchiveDescriptor {
        ArchiveDescriptor {
            version: "1".to_string(),
            image: ImageRef {
                name: "svc:latest".to_string(),
                update: "true".to_string(),
            },
            ports: vec![PortMapping {
                container_port: "3000".to_string(),
            }],
            volumes: None,
            authentication: None,
        }
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn read_entry(path: &Path, name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        content
    }

    #[test]
    fn test_assemble_descriptor_only() {
        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");

        ArchiveAssembler::assemble(&descriptor(), None, &destination).unwrap();

        assert_eq!(entry_names(&destination), vec![DESCRIPTOR_FILE_NAME]);
        let content = read_entry(&destination, DESCRIPTOR_FILE_NAME);
        let value: serde_json::Value = serde_json::from_slice(&content).unwrap();
        assert_eq!(value["Image"]["Name"], "svc:latest");
    }

    #[test]
    fn test_assemble_with_extensions() {
        let source = tempdir().unwrap();
        let extensions = source.path().join(".ebextensions");
        fs::create_dir_all(extensions.join("nginx/conf.d")).unwrap();
        fs::write(extensions.join("01-env.config"), "option_settings: []\n").unwrap();
        fs::write(
            extensions.join("nginx/conf.d/proxy.conf"),
            [0u8, 159, 146, 150, b'\n'],
        )
        .unwrap();

        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");
        ArchiveAssembler::assemble(&descriptor(), Some(&extensions), &destination).unwrap();

        let names = entry_names(&destination);
        assert!(names.contains(&DESCRIPTOR_FILE_NAME.to_string()));
        assert!(names.contains(&".ebextensions/01-env.config".to_string()));
        assert!(names.contains(&".ebextensions/nginx/conf.d/proxy.conf".to_string()));

        // バイト列がそのままコピーされていること
        assert_eq!(
            read_entry(&destination, ".ebextensions/nginx/conf.d/proxy.conf"),
            vec![0u8, 159, 146, 150, b'\n']
        );
    }

    #[test]
    fn test_missing_extensions_dir_is_skipped() {
        let source = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");

        ArchiveAssembler::assemble(
            &descriptor(),
            Some(&source.path().join(".ebextensions")),
            &destination,
        )
        .unwrap();

        assert_eq!(entry_names(&destination), vec![DESCRIPTOR_FILE_NAME]);
    }

    #[test]
    fn test_assemble_overwrites_existing_archive() {
        let source = tempdir().unwrap();
        let extensions = source.path().join(".ebextensions");
        fs::create_dir_all(&extensions).unwrap();
        fs::write(extensions.join("stale.config"), "stale").unwrap();

        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");

        ArchiveAssembler::assemble(&descriptor(), Some(&extensions), &destination).unwrap();
        assert!(entry_names(&destination).contains(&".ebextensions/stale.config".to_string()));

        ArchiveAssembler::assemble(&descriptor(), None, &destination).unwrap();
        assert_eq!(entry_names(&destination), vec![DESCRIPTOR_FILE_NAME]);
    }

    #[test]
    fn test_assemble_replaces_non_archive_file() {
        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");
        fs::write(&destination, "not a zip file").unwrap();

        ArchiveAssembler::assemble(&descriptor(), None, &destination).unwrap();
        assert_eq!(entry_names(&destination), vec![DESCRIPTOR_FILE_NAME]);
    }

    #[test]
    fn test_failed_assembly_leaves_no_destination() {
        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("missing-dir").join("app.zip");

        let result = ArchiveAssembler::assemble(&descriptor(), None, &destination);
        assert!(result.is_err());
        assert!(!destination.exists());
    }

    #[test]
    fn test_no_temporary_files_left_next_to_destination() {
        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");

        ArchiveAssembler::assemble(&descriptor(), None, &destination).unwrap();

        let leftovers: Vec<_> = fs::read_dir(out_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != "app.zip")
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
    }

    #[test]
    fn test_directory_destination_is_refused() {
        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("dist");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("keep.txt"), "keep").unwrap();

        let err = ArchiveAssembler::assemble(&descriptor(), None, &destination).unwrap_err();
        assert!(matches!(err, BundleError::Persist { ref path, .. } if path == &destination));

        // ディレクトリと中身はそのまま残る
        assert_eq!(fs::read_to_string(destination.join("keep.txt")).unwrap(), "keep");
        let entries: Vec<_> = fs::read_dir(out_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("dist")]);
    }

    #[test]
    fn test_extensions_dir_without_name_is_rejected() {
        let source = tempdir().unwrap();
        fs::create_dir(source.path().join("nested")).unwrap();
        let parent_ref = source.path().join("nested").join("..");

        let out_dir = tempdir().unwrap();
        let destination = out_dir.path().join("app.zip");

        for dir in [Path::new("."), parent_ref.as_path()] {
            let err =
                ArchiveAssembler::assemble(&descriptor(), Some(dir), &destination).unwrap_err();
            assert!(matches!(err, BundleError::InvalidExtensionsDir { .. }));
            assert!(!destination.exists());
        }
    }

    #[test]
    fn test_assemble_to_bytes() {
        let bytes = ArchiveAssembler::assemble_to_bytes(&descriptor(), None).unwrap();
        let archive = ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.file_names().next(), Some(DESCRIPTOR_FILE_NAME));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let path = Path::new("a").join("b").join("c.config");
        assert_eq!(entry_name(&path), "a/b/c.config");
    }
}
