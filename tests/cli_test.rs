use assert_cmd::Command; // Run programs, feed stdin
use predicates::prelude::*;
use std::path::Path;
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

// Some text with a skewed distribution and every byte value somewhere.
fn sample_data() -> Vec<u8> {
    let mut ans: Vec<u8> = Vec::new();
    for _i in 0..200 {
        ans.append(&mut SAM.as_bytes().to_vec());
    }
    for i in 0..=255 {
        ans.push(i);
    }
    ans
}

fn compress_file(in_path: &Path,out_path: &Path) -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("compress")
        .arg("-i").arg(in_path)
        .arg("-o").arg(out_path)
        .assert()
        .success();
    Ok(())
}

fn expand_file(in_path: &Path,out_path: &Path) -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("expand")
        .arg("-i").arg(in_path)
        .arg("-o").arg(out_path)
        .assert()
        .success();
    Ok(())
}

#[test]
fn file_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sample.txt");
    let cmp_path = temp_dir.path().join("sample.huf");
    let exp_path = temp_dir.path().join("sample.out");
    std::fs::write(&orig_path,sample_data())?;
    compress_file(&orig_path,&cmp_path)?;
    expand_file(&cmp_path,&exp_path)?;
    let compressed = std::fs::read(&cmp_path)?;
    assert!(compressed.len() < sample_data().len());
    assert_eq!(compressed[0..4],[0x0D,0xD0,0xEF,0xBE]);
    assert_eq!(std::fs::read(&exp_path)?,sample_data());
    Ok(())
}

#[test]
fn empty_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("empty.txt");
    let cmp_path = temp_dir.path().join("empty.huf");
    let exp_path = temp_dir.path().join("empty.out");
    std::fs::write(&orig_path,b"")?;
    compress_file(&orig_path,&cmp_path)?;
    expand_file(&cmp_path,&exp_path)?;
    // header and the two sentinel leaves
    assert_eq!(std::fs::read(&cmp_path)?.len(),16 + 5);
    assert_eq!(std::fs::read(&exp_path)?.len(),0);
    Ok(())
}

#[test]
fn overwrite_is_truncated() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sam.txt");
    let cmp_path = temp_dir.path().join("sam.huf");
    std::fs::write(&orig_path,SAM)?;
    std::fs::write(&cmp_path,vec![0xaa;4096])?;
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("compress")
        .arg("-f")
        .arg("-i").arg(&orig_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success();
    assert!(std::fs::read(&cmp_path)?.len() < 4096);
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("expand")
        .arg("-i").arg(&cmp_path)
        .assert()
        .success()
        .stdout(SAM);
    Ok(())
}

#[test]
fn pipe_round_trip() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    let output = cmd.arg("compress")
        .write_stdin(sample_data())
        .output()?;
    assert!(output.status.success());
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("expand")
        .write_stdin(output.stdout)
        .assert()
        .success()
        .stdout(sample_data());
    Ok(())
}

#[test]
fn stats_are_reported() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("compress")
        .arg("-v")
        .write_stdin(sample_data())
        .assert()
        .success()
        .stderr(predicate::str::contains("Uncompressed file size: 10056 bytes"))
        .stderr(predicate::str::contains("Space saving:"));
    Ok(())
}

#[test]
fn bad_input_fails() -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffpress")?;
    cmd.arg("expand")
        .write_stdin(SAM)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FileFormatMismatch"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn permissions_propagate() -> STDRESULT {
    use std::os::unix::fs::PermissionsExt;
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sam.txt");
    let cmp_path = temp_dir.path().join("sam.huf");
    let exp_path = temp_dir.path().join("sam.out");
    std::fs::write(&orig_path,SAM)?;
    std::fs::set_permissions(&orig_path,std::fs::Permissions::from_mode(0o640))?;
    compress_file(&orig_path,&cmp_path)?;
    expand_file(&cmp_path,&exp_path)?;
    assert_eq!(std::fs::metadata(&exp_path)?.permissions().mode() & 0o777,0o640);
    Ok(())
}
