//! Performance benchmarks for oj-scrape.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oj_scrape::embed::FetchedImage;
use oj_scrape::status::parse_status_table;
use oj_scrape::{assemble, sanitize, Error, ImageCache, Options, ProblemPage, Result};
use url::Url;

const PROBLEM_HTML: &str = r#"
<!DOCTYPE html>
<html lang="zh">
<head><meta charset="UTF-8"><title>1000: A+B Problem</title></head>
<body>
<div class="padding">
  <div class="ui center aligned grid"><div class="row">
    <h1 class="ui header">1000: A+B Problem</h1>
    <span class="ui label">时间限制：1 Sec</span>
    <span class="ui label">内存限制：128 MB</span>
  </div></div>
  <h4 class="ui top attached block header">题目描述</h4>
  <div class="ui bottom attached segment font-content">
    <p>Given <b>two</b> integers, print their sum.</p>
    <p><img src="/upload/figure.png"></p>
    <table border="1"><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>
  </div>
  <h4 class="ui top attached block header">输入</h4>
  <div class="ui bottom attached segment font-content">Two integers a and b.</div>
  <h4 class="ui top attached block header">输出</h4>
  <div class="ui bottom attached segment font-content">Their sum.</div>
  <h4 class="ui top attached block header">样例输入 <span class="copy">复制</span></h4>
  <div class="ui bottom attached segment font-content"><pre>1 2
</pre></div>
  <h4 class="ui top attached block header">样例输出 <span class="copy">复制</span></h4>
  <div class="ui bottom attached segment font-content"><pre>3
</pre></div>
  <div id="show_tag_div"><a class="ui label">math</a><a class="ui label">beginner</a></div>
</div>
</body>
</html>
"#;

const RICH_FRAGMENT: &str = r#"
<div style="color:red" onclick="x()"><font face="serif">Let <i>n</i> be</font>
<span>the <sup>2</sup> count</span><br><br><br>
<script>alert(1)</script><p>&nbsp;</p><p></p>
<table><caption>t</caption><tr><td><a href="javascript:alert(1)">x</a></td></tr></table>
<ul><li><p>first</p></li><li>second</li></ul><pre>  keep
   spacing</pre></div>
"#;

fn status_html(rows: usize) -> String {
    let mut html = String::from(
        r#"<table id="result-tab"><thead><tr><th>运行编号</th><th>用户</th><th>昵称</th><th>问题</th><th>结果</th><th>内存</th><th>耗时</th><th>语言</th><th>代码长度</th><th>提交时间</th></tr></thead><tbody>"#,
    );
    for id in (0..rows).rev() {
        html.push_str(&format!(
            r#"<tr><td>{id}</td><td>u</td><td>nick</td><td><a href="problem.php?id=1000">1000</a></td><td><span result="4">正确</span></td><td>1024</td><td>3</td><td>C++</td><td>120 B</td><td>2024-05-01 10:00:{:02}</td></tr>"#,
            id % 60
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn offline(_: &str) -> Result<FetchedImage> {
    Err(Error::Transport("offline".into()))
}

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_fragment", |b| {
        b.iter(|| sanitize(black_box(RICH_FRAGMENT)));
    });
}

fn bench_assemble(c: &mut Criterion) {
    let url = Url::parse("https://oj.example/problem.php?id=1000").unwrap_or_else(|_| unreachable!());
    let options = Options {
        embed_images: false,
        ..Options::default()
    };
    c.bench_function("assemble_problem", |b| {
        b.iter(|| {
            let page = ProblemPage::new(black_box(PROBLEM_HTML), url.clone(), "1000");
            assemble(&page, &offline, &ImageCache::new(), &options)
        });
    });
}

fn bench_status_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("status_table");
    for rows in [20, 200] {
        let html = status_html(rows);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &html, |b, html| {
            b.iter(|| {
                let doc = oj_scrape::dom::parse(black_box(html));
                parse_status_table(&doc, None)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sanitize, bench_assemble, bench_status_table);
criterion_main!(benches);
