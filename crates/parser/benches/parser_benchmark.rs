use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parser::Parser;

fn token_contract(index: usize) -> String {
    format!(
        r#"
contract Token{index} is Base{index}, Ownable {{
    struct Holder {{ address account; uint256[3] balances; }}
    mapping(address => uint256) public balanceOf;
    event Transfer(address indexed from, address indexed to, uint256 value);
    error Insufficient(uint256 needed, uint256 available);

    /* rebalance holders
       across the pool */
    function transfer(address to, uint256 amount) external returns (bool) {{
        if (amount > balanceOf[msg.sender]) {{ revert Insufficient(amount, balanceOf[msg.sender]); }}
        emit Transfer(msg.sender, to, amount);
        return true;
    }}

    function holders(Holder[] calldata list) public view onlyOwner returns (uint256 total) {{
        for (uint256 i = 0; i < list.length; i++) {{ total += list[i].balances[0]; }}
    }}
}}
"#
    )
}

fn benchmark_parser_performance(c: &mut Criterion) {
    let source: String = (0..50).map(token_contract).collect();
    let parser = Parser::new();

    c.bench_function("parse 50 contracts", |b| {
        b.iter(|| {
            let unit = parser.parse(black_box(&source), "Bench.sol").ok();
            black_box(unit)
        })
    });
}

criterion_group!(benches, benchmark_parser_performance);
criterion_main!(benches);
